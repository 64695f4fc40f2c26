/// Forum, thread, page and post primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// User keys are assigned by the identity provider, never generated here.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
