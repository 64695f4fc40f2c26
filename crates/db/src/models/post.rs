//! Post entity model, DTOs and the page-view representation.

use agora_core::limits::POST_CONTENT_MAX;
use agora_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: DbId,
    pub user_id: UserId,
    pub page_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub edited_at: Option<Timestamp>,
}

/// A post together with the thread its page belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct PostInThread {
    #[sqlx(flatten)]
    pub post: Post,
    pub thread_id: DbId,
}

/// A post as shown on a page, annotated with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub id: DbId,
    pub user_id: UserId,
    /// `None` if the author record is gone.
    pub user_name: Option<String>,
    pub page_id: DbId,
    pub content: String,
    #[serde(rename = "dateCreated")]
    pub created_at: Timestamp,
    #[serde(rename = "dateEdited")]
    pub edited_at: Option<Timestamp>,
}

impl PostView {
    pub fn new(post: Post, user_name: Option<String>) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            user_name,
            page_id: post.page_id,
            content: post.content,
            created_at: post.created_at,
            edited_at: post.edited_at,
        }
    }
}

/// DTO for appending a post to a thread.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(length(min = 1, max = POST_CONTENT_MAX))]
    pub content: String,
}

/// DTO for editing a post's content.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditPost {
    pub post_id: DbId,
    #[validate(length(min = 1, max = POST_CONTENT_MAX))]
    pub content: String,
}

/// DTO for soft-deleting a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeletePost {
    pub post_id: DbId,
}
