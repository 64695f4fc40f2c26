//! Thread pagination rules.
//!
//! A thread's posts live on fixed-capacity pages numbered densely from 1.
//! Stores ask [`place_post`] where the next post goes, and validate page
//! requests with [`check_page_number`].

use chrono::Duration;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum number of posts on one page.
pub const PAGE_CAPACITY: i64 = 40;

/// The highest-numbered page of a thread and how many posts it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastPage {
    pub page_number: i32,
    pub post_count: i64,
}

/// Where the next post of a thread should be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Create a page with this number, then write to it.
    Open { page_number: i32 },
    /// Write to the existing page with this number.
    Reuse { page_number: i32 },
}

impl Placement {
    pub fn page_number(self) -> i32 {
        match self {
            Placement::Open { page_number } | Placement::Reuse { page_number } => page_number,
        }
    }
}

/// Decide the page for the next post given the thread's current last page.
///
/// The capacity check asks whether adding one more post would exceed
/// [`PAGE_CAPACITY`], so a page never holds more than that many posts.
pub fn place_post(last: Option<LastPage>) -> Placement {
    match last {
        None => Placement::Open { page_number: 1 },
        Some(last) if last.post_count + 1 > PAGE_CAPACITY => Placement::Open {
            page_number: last.page_number + 1,
        },
        Some(last) => Placement::Reuse {
            page_number: last.page_number,
        },
    }
}

/// Validate a 1-based page request against the number of pages in a thread,
/// returning the zero-based index of the page.
pub fn check_page_number(
    thread_id: DbId,
    requested: i64,
    page_count: usize,
) -> Result<usize, CoreError> {
    if requested < 1 || requested as u64 > page_count as u64 {
        return Err(CoreError::NotFound {
            entity: "Page",
            id: format!("{requested} of thread {thread_id}"),
        });
    }
    Ok((requested - 1) as usize)
}

/// Next creation timestamp for a store whose last issued timestamp was
/// `previous`: `now`, unless that would not be strictly later.
pub fn next_timestamp(previous: Option<Timestamp>, now: Timestamp) -> Timestamp {
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

/// Author ids of a page's posts, deduplicated in first-seen order, for the
/// batched display-name lookup.
pub fn distinct_authors<'a, I>(author_ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    for id in author_ids {
        if !seen.iter().any(|s: &String| s == id) {
            seen.push(id.to_string());
        }
    }
    seen
}
