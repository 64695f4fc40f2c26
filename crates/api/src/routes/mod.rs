//! Route tables, one module per resource.

pub mod admin;
pub mod forum;
pub mod health;
pub mod thread;

use axum::Router;

use crate::state::AppState;

/// All forum API routes, mounted at the root.
///
/// ```text
/// GET    /                            forum list
/// GET    /all                         forum list
/// GET    /forum/{id}                  forum with thread summaries
/// POST   /forum/{id}                  create thread
///
/// GET    /threads/{id}                thread summary
/// GET    /threads/{id}/{page}         page of posts
/// POST   /threads/{id}                append post
/// PATCH  /threads/{id}                edit post
/// DELETE /threads/{id}                soft-delete post
///
/// /admin                              admin routes (see admin::router)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(forum::router())
        .nest("/threads", thread::router())
        .nest("/admin", admin::router())
}
