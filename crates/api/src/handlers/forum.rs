//! Handlers for forums and thread creation.

use agora_core::error::CoreError;
use agora_core::types::DbId;
use agora_db::models::forum::Forum;
use agora_db::models::thread::{CreateThread, PageView, ThreadSummary};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{Path, ValidJson};
use crate::middleware::rbac::CanPostThread;
use crate::response::Success;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ForumList {
    pub forums: Vec<Forum>,
}

#[derive(Debug, Serialize)]
pub struct ForumDetail {
    pub forum: Forum,
    pub threads: Vec<ThreadSummary>,
}

#[derive(Debug, Serialize)]
pub struct CreatedThread {
    pub thread: PageView,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET / (also GET /all)
///
/// List every forum.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let forums = state.store.list_forums().await?;
    Ok(Json(Success::new(ForumList { forums })))
}

/// GET /forum/{id}
///
/// A forum and the summaries of its threads.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let forum = state
        .store
        .find_forum(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Forum", id))?;
    let threads = state.store.list_threads(id).await?;
    Ok(Json(Success::new(ForumDetail { forum, threads })))
}

/// POST /forum/{id}
///
/// Open a thread with its first post. Responds with the thread's first page.
pub async fn create_thread(
    State(state): State<AppState>,
    caller: CanPostThread,
    Path(forum_id): Path<DbId>,
    ValidJson(input): ValidJson<CreateThread>,
) -> AppResult<impl IntoResponse> {
    let thread = state
        .store
        .create_thread(forum_id, caller.user_id(), &input)
        .await?;
    let page = state.store.page_view(thread.id, 1).await?;
    Ok(Json(Success::new(CreatedThread { thread: page })))
}
