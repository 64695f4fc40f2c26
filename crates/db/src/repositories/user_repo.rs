//! Repository for the `users` table.

use agora_core::moderation::Standing;
use sqlx::PgExecutor;

use crate::models::user::{CreateUser, User, UserName};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, role, status, joined_at, \
                       probation_start_date, probation_end_date";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, name, role) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.user_id)
            .bind(&input.name)
            .bind(input.role.as_str())
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Fetch a user and hold its row lock until the transaction ends.
    pub async fn lock_for_update<'e>(
        executor: impl PgExecutor<'e>,
        id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all users, earliest joined first.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY joined_at, id");
        sqlx::query_as::<_, User>(&query).fetch_all(executor).await
    }

    /// Display names for a set of user ids, in one round trip.
    pub async fn names<'e>(
        executor: impl PgExecutor<'e>,
        ids: &[String],
    ) -> Result<Vec<UserName>, sqlx::Error> {
        sqlx::query_as::<_, UserName>("SELECT id, name FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// Write role, status and probation window.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_standing<'e>(
        executor: impl PgExecutor<'e>,
        id: &str,
        standing: &Standing,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                role = $2, \
                status = $3, \
                probation_start_date = $4, \
                probation_end_date = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(standing.role.as_str())
            .bind(standing.status.as_str())
            .bind(standing.probation_start_date)
            .bind(standing.probation_end_date)
            .fetch_optional(executor)
            .await
    }
}
