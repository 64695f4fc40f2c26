use std::sync::Arc;

use agora_db::ForumStore;

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence: PostgreSQL or the in-memory arena.
    pub store: Arc<dyn ForumStore>,
    /// Access-token verification.
    pub verifier: Arc<dyn TokenVerifier>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
