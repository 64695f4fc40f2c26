//! Repository for the `posts` table.

use agora_core::limits::DELETED_POST_CONTENT;
use agora_core::types::{DbId, Timestamp};
use sqlx::PgExecutor;

use crate::models::post::{Post, PostInThread};

const COLUMNS: &str = "id, user_id, page_id, content, created_at, edited_at";

pub struct PostRepo;

impl PostRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        page_id: DbId,
        user_id: &str,
        content: &str,
        created_at: Timestamp,
    ) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (page_id, user_id, content, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(page_id)
            .bind(user_id)
            .bind(content)
            .bind(created_at)
            .fetch_one(executor)
            .await
    }

    /// Find a post along with the id of the thread it lives in.
    pub async fn find_with_thread<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<PostInThread>, sqlx::Error> {
        sqlx::query_as::<_, PostInThread>(
            "SELECT po.id, po.user_id, po.page_id, po.content, po.created_at, po.edited_at, \
                    p.thread_id \
             FROM posts po \
             JOIN pages p ON p.id = po.page_id \
             WHERE po.id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Posts of a page in creation order, id breaking ties.
    pub async fn list_by_page<'e>(
        executor: impl PgExecutor<'e>,
        page_id: DbId,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts WHERE page_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(page_id)
            .fetch_all(executor)
            .await
    }

    /// Replace the content and stamp the edit time.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_content<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        content: &str,
        edited_at: Timestamp,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET content = $2, edited_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(content)
            .bind(edited_at)
            .fetch_optional(executor)
            .await
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        deleted_at: Timestamp,
    ) -> Result<Option<Post>, sqlx::Error> {
        Self::update_content(executor, id, DELETED_POST_CONTENT, deleted_at).await
    }

    pub async fn delete_by_thread<'e>(
        executor: impl PgExecutor<'e>,
        thread_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM posts WHERE page_id IN (SELECT id FROM pages WHERE thread_id = $1)",
        )
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
            "DELETE FROM posts WHERE page_id IN ( \
                 SELECT p.id FROM pages p \
                 JOIN threads t ON t.id = p.thread_id \
                 WHERE t.forum_id = $1)",
        )
        .bind(forum_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
