//! Shared response envelope types for API handlers.
//!
//! Successful responses carry `"status": "SUCCESS"` next to their payload
//! fields, e.g. `{ "status": "SUCCESS", "forums": [...] }`. Use
//! [`Success`] rather than building the map by hand.

use agora_core::moderation::Outcome;
use serde::Serialize;

/// `{ "status": "SUCCESS", ...T }` response envelope.
///
/// `T` must serialize as a map; its fields are flattened next to `status`.
///
/// # Example
///
/// ```ignore
/// Ok(Json(Success::new(ForumList { forums })))
/// ```
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub status: Outcome,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(body: T) -> Self {
        Self {
            status: Outcome::Success,
            body,
        }
    }

    /// Envelope whose status reports a moderation outcome.
    pub fn with_outcome(status: Outcome, body: T) -> Self {
        Self { status, body }
    }
}

/// Body for responses that carry nothing but the status.
#[derive(Debug, Serialize)]
pub struct Empty {}
