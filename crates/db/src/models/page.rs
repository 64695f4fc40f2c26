//! Page entity model.

use agora_core::pagination::LastPage;
use agora_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pages` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Page {
    pub id: DbId,
    pub thread_id: DbId,
    pub page_number: i32,
}

/// The last page of a thread together with how many posts it holds.
#[derive(Debug, Clone, FromRow)]
pub struct PageFill {
    pub id: DbId,
    pub page_number: i32,
    pub post_count: i64,
}

impl PageFill {
    pub fn last_page(&self) -> LastPage {
        LastPage {
            page_number: self.page_number,
            post_count: self.post_count,
        }
    }
}
