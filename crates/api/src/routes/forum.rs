use axum::routing::get;
use axum::Router;

use crate::handlers::forum;
use crate::state::AppState;

/// Forum listing and thread creation, mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(forum::list))
        .route("/all", get(forum::list))
        .route("/forum/{id}", get(forum::get).post(forum::create_thread))
}
