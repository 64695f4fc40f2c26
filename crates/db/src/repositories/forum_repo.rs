//! Repository for the `forums` table.

use agora_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::forum::{CreateForum, Forum};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description";

/// Provides CRUD operations for forums.
pub struct ForumRepo;

impl ForumRepo {
    /// Insert a new forum, returning the created row.
    ///
    /// A taken name violates `uq_forums_name`.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateForum,
    ) -> Result<Forum, sqlx::Error> {
        let query = format!(
            "INSERT INTO forums (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Forum>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Forum>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forums WHERE id = $1");
        sqlx::query_as::<_, Forum>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all forums in creation order.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Forum>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forums ORDER BY id");
        sqlx::query_as::<_, Forum>(&query).fetch_all(executor).await
    }

    /// Delete the forum row only. Dependents must already be gone.
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forums WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
