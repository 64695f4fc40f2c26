use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the `admin` permission.
///
/// ```text
/// POST /create/forum          -> create_forum
/// GET  /users                 -> list_users
/// POST /user                  -> create_user
/// POST /user/role             -> set_role
/// POST /ban-user              -> ban_user
/// POST /threads/{id}/lock     -> lock_thread
/// POST /threads/{id}/unlock   -> unlock_thread
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/forum", post(admin::create_forum))
        .route("/users", get(admin::list_users))
        .route("/user", post(admin::create_user))
        .route("/user/role", post(admin::set_role))
        .route("/ban-user", post(admin::ban_user))
        .route("/threads/{id}/lock", post(admin::lock_thread))
        .route("/threads/{id}/unlock", post(admin::unlock_thread))
}
