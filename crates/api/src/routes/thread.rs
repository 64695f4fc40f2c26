use axum::routing::get;
use axum::Router;

use crate::handlers::thread;
use crate::state::AppState;

/// Routes mounted at `/threads`.
///
/// ```text
/// GET    /{id}          -> get
/// POST   /{id}          -> create_post
/// PATCH  /{id}          -> edit_post
/// DELETE /{id}          -> delete_post
/// GET    /{id}/{page}   -> get_page
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(thread::get)
                .post(thread::create_post)
                .patch(thread::edit_post)
                .delete(thread::delete_post),
        )
        .route("/{id}/{page}", get(thread::get_page))
}
