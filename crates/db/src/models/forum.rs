//! Forum entity model and DTOs.

use agora_core::limits::{FORUM_DESCRIPTION_MAX, FORUM_NAME_MAX};
use agora_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `forums` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Forum {
    pub id: DbId,
    pub name: String,
    pub description: String,
}

/// DTO for creating a forum.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateForum {
    #[validate(length(min = 1, max = FORUM_NAME_MAX))]
    pub name: String,
    #[validate(length(min = 1, max = FORUM_DESCRIPTION_MAX))]
    pub description: String,
}
