//! Handlers for reading threads and working with their posts.

use agora_core::auth::Claims;
use agora_core::error::CoreError;
use agora_core::ownership::ensure_can_modify;
use agora_core::types::DbId;
use agora_db::models::post::{CreatePost, DeletePost, EditPost, Post};
use agora_db::models::thread::{PageView, ThreadSummary};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{Path, ValidJson};
use crate::middleware::rbac::{CanDeletePost, CanEditPost, CanPostPost};
use crate::response::{Empty, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ThreadBody {
    pub thread: ThreadSummary,
}

#[derive(Debug, Serialize)]
pub struct PageBody {
    pub page: PageView,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn summary(state: &AppState, id: DbId) -> AppResult<ThreadSummary> {
    Ok(state
        .store
        .thread_summary(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Thread", id))?)
}

/// Resolve `post_id` within `thread_id` and check the caller may modify it.
///
/// A post that lives in another thread is reported as missing.
async fn owned_post(
    state: &AppState,
    claims: &Claims,
    thread_id: DbId,
    post_id: DbId,
) -> AppResult<Post> {
    let found = state
        .store
        .find_post(post_id)
        .await?
        .filter(|found| found.thread_id == thread_id)
        .ok_or_else(|| CoreError::not_found("Post", post_id))?;

    ensure_can_modify(claims, &found.post.user_id, post_id)?;
    Ok(found.post)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /threads/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let thread = summary(&state, id).await?;
    Ok(Json(Success::new(ThreadBody { thread })))
}

/// GET /threads/{id}/{page}
///
/// One page of posts, 1-based.
pub async fn get_page(
    State(state): State<AppState>,
    Path((id, page_number)): Path<(DbId, i64)>,
) -> AppResult<impl IntoResponse> {
    let page = state.store.page_view(id, page_number).await?;
    Ok(Json(Success::new(PageBody { page })))
}

/// POST /threads/{id}
///
/// Append a post. Responds with the updated thread summary.
pub async fn create_post(
    State(state): State<AppState>,
    caller: CanPostPost,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<CreatePost>,
) -> AppResult<impl IntoResponse> {
    state
        .store
        .append_post(id, caller.user_id(), &input.content)
        .await?;
    let thread = summary(&state, id).await?;
    Ok(Json(Success::new(ThreadBody { thread })))
}

/// PATCH /threads/{id}
///
/// Edit a post's content. Author or admin only.
pub async fn edit_post(
    State(state): State<AppState>,
    caller: CanEditPost,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<EditPost>,
) -> AppResult<impl IntoResponse> {
    let post = owned_post(&state, &caller.claims, id, input.post_id).await?;
    state
        .store
        .edit_post(post.id, &input.content)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post.id))?;
    Ok(Json(Success::new(Empty {})))
}

/// DELETE /threads/{id}
///
/// Soft-delete a post. Author or admin only.
pub async fn delete_post(
    State(state): State<AppState>,
    caller: CanDeletePost,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<DeletePost>,
) -> AppResult<impl IntoResponse> {
    let post = owned_post(&state, &caller.claims, id, input.post_id).await?;
    state
        .store
        .soft_delete_post(post.id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post.id))?;
    Ok(Json(Success::new(Empty {})))
}
