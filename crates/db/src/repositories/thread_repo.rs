//! Repository for the `threads` table.

use agora_core::types::{DbId, Timestamp};
use sqlx::PgExecutor;

use crate::models::thread::{Thread, ThreadSummary};

const COLUMNS: &str = "id, forum_id, user_id, title, created_at, locked";

/// Summary columns: the thread plus its page count.
const SUMMARY_COLUMNS: &str = "t.forum_id, t.id, t.user_id, t.title, t.created_at, t.locked, \
                               (SELECT COUNT(*) FROM pages p WHERE p.thread_id = t.id) AS pages";

pub struct ThreadRepo;

impl ThreadRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        forum_id: DbId,
        user_id: &str,
        title: &str,
        created_at: Timestamp,
    ) -> Result<Thread, sqlx::Error> {
        let query = format!(
            "INSERT INTO threads (forum_id, user_id, title, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Thread>(&query)
            .bind(forum_id)
            .bind(user_id)
            .bind(title)
            .bind(created_at)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Thread>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM threads WHERE id = $1");
        sqlx::query_as::<_, Thread>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Fetch the thread and take a row lock on it until the transaction ends.
    ///
    /// Every post append goes through here first, which serializes the
    /// page-capacity check per thread.
    pub async fn lock_for_append<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Thread>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM threads WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Thread>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn summary<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<ThreadSummary>, sqlx::Error> {
        let query = format!("SELECT {SUMMARY_COLUMNS} FROM threads t WHERE t.id = $1");
        sqlx::query_as::<_, ThreadSummary>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Thread summaries of a forum, oldest first.
    pub async fn list_by_forum<'e>(
        executor: impl PgExecutor<'e>,
        forum_id: DbId,
    ) -> Result<Vec<ThreadSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM threads t \
             WHERE t.forum_id = $1 \
             ORDER BY t.created_at, t.id"
        );
        sqlx::query_as::<_, ThreadSummary>(&query)
            .bind(forum_id)
            .fetch_all(executor)
            .await
    }

    /// Returns `false` if no row with the given `id` exists.
    pub async fn set_locked<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        locked: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE threads SET locked = $2 WHERE id = $1")
            .bind(id)
            .bind(locked)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM threads WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_forum<'e>(
        executor: impl PgExecutor<'e>,
        forum_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM threads WHERE forum_id = $1")
            .bind(forum_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
