use agora_core::error::CoreError;

/// Error returned by every [`ForumStore`](crate::store::ForumStore) method.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Any database failure that is not a known constraint violation.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Unique violations on named constraints become `Conflict`; everything else
/// stays a database error.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") || constraint.ends_with("_pkey") {
                    return StoreError::Core(CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    )));
                }
            }
        }
        StoreError::Database(err)
    }
}
