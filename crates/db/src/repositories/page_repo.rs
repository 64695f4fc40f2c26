//! Repository for the `pages` table.

use agora_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::page::{Page, PageFill};

const COLUMNS: &str = "id, thread_id, page_number";

pub struct PageRepo;

impl PageRepo {
    /// Insert a page. A duplicate number violates `uq_pages_thread_page`.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        thread_id: DbId,
        page_number: i32,
    ) -> Result<Page, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages (thread_id, page_number) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(thread_id)
            .bind(page_number)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_number<'e>(
        executor: impl PgExecutor<'e>,
        thread_id: DbId,
        page_number: i32,
    ) -> Result<Option<Page>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM pages WHERE thread_id = $1 AND page_number = $2");
        sqlx::query_as::<_, Page>(&query)
            .bind(thread_id)
            .bind(page_number)
            .fetch_optional(executor)
            .await
    }

    pub async fn count_for_thread<'e>(
        executor: impl PgExecutor<'e>,
        thread_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pages WHERE thread_id = $1")
            .bind(thread_id)
            .fetch_one(executor)
            .await
    }

    /// The highest-numbered page of a thread and its post count.
    pub async fn last_with_fill<'e>(
        executor: impl PgExecutor<'e>,
        thread_id: DbId,
    ) -> Result<Option<PageFill>, sqlx::Error> {
        sqlx::query_as::<_, PageFill>(
            "SELECT p.id, p.page_number, \
                    (SELECT COUNT(*) FROM posts po WHERE po.page_id = p.id) AS post_count \
             FROM pages p \
             WHERE p.thread_id = $1 \
             ORDER BY p.page_number DESC \
             LIMIT 1",
        )
        .bind(thread_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete_by_thread<'e>(
        executor: impl PgExecutor<'e>,
        thread_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE thread_id = $1")
            .bind(thread_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_forum<'e>(
        executor: impl PgExecutor<'e>,
        forum_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM pages WHERE thread_id IN (SELECT id FROM threads WHERE forum_id = $1)",
        )
        .bind(forum_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
