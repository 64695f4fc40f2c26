//! Thread entity model, DTOs and views.

use agora_core::limits::{POST_CONTENT_MAX, THREAD_TITLE_MAX};
use agora_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::post::PostView;

/// A row from the `threads` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Thread {
    pub id: DbId,
    pub forum_id: DbId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: Timestamp,
    pub locked: bool,
}

/// Thread listing entry: reports how many pages the thread has, not their
/// content.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ThreadSummary {
    #[serde(rename = "forumId")]
    pub forum_id: DbId,
    pub id: DbId,
    pub user_id: UserId,
    pub title: String,
    #[serde(rename = "dateCreated")]
    pub created_at: Timestamp,
    pub pages: i64,
    pub locked: bool,
}

impl ThreadSummary {
    pub fn new(thread: Thread, pages: i64) -> Self {
        Self {
            forum_id: thread.forum_id,
            id: thread.id,
            user_id: thread.user_id,
            title: thread.title,
            created_at: thread.created_at,
            pages,
            locked: thread.locked,
        }
    }
}

/// One page of a thread with its posts in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    #[serde(rename = "forumId")]
    pub forum_id: DbId,
    /// The thread id.
    pub id: DbId,
    pub title: String,
    #[serde(rename = "dateCreated")]
    pub created_at: Timestamp,
    #[serde(rename = "pageNumber")]
    pub page_number: i32,
    pub posts: Vec<PostView>,
    pub locked: bool,
}

impl PageView {
    pub fn new(thread: Thread, page_number: i32, posts: Vec<PostView>) -> Self {
        Self {
            forum_id: thread.forum_id,
            id: thread.id,
            title: thread.title,
            created_at: thread.created_at,
            page_number,
            posts,
            locked: thread.locked,
        }
    }
}

/// DTO for opening a thread together with its first post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateThread {
    #[validate(length(min = 1, max = THREAD_TITLE_MAX))]
    pub title: String,
    #[validate(length(min = 1, max = POST_CONTENT_MAX))]
    pub content: String,
}
