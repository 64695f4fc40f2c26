//! Admin-only handlers: forum creation, user registry and moderation.
//!
//! Every handler takes [`RequireAdmin`], so a caller without the `admin`
//! permission never reaches the store.

use agora_core::error::CoreError;
use agora_core::moderation::Standing;
use agora_core::roles::Role;
use agora_core::types::{DbId, UserId};
use agora_db::models::forum::{CreateForum, Forum};
use agora_db::models::thread::ThreadSummary;
use agora_db::models::user::{BanRequest, CreateUser, RoleRequest, User};
use agora_db::StandingChange;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SubsecRound, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{Path, ValidJson};
use crate::handlers::thread::ThreadBody;
use crate::middleware::rbac::RequireAdmin;
use crate::response::Success;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedForum {
    pub message: String,
    pub forum: Forum,
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ModerationResult {
    pub message: String,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run `change` against the user's stored standing and build the response.
async fn moderate(
    state: &AppState,
    id: &str,
    change: StandingChange,
    applied_message: &str,
) -> AppResult<Success<ModerationResult>> {
    let (user, outcome) = state
        .store
        .moderate(id, change)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;

    let message = if outcome.applied() {
        applied_message.to_string()
    } else {
        "No change applied".to_string()
    };
    Ok(Success::with_outcome(
        outcome,
        ModerationResult { message, user },
    ))
}

async fn set_locked(state: &AppState, id: DbId, locked: bool) -> AppResult<ThreadSummary> {
    let thread = state
        .store
        .set_thread_locked(id, locked)
        .await?
        .ok_or_else(|| CoreError::not_found("Thread", id))?;
    tracing::info!(thread_id = id, locked, "Thread lock changed");
    Ok(thread)
}

// ---------------------------------------------------------------------------
// Forums
// ---------------------------------------------------------------------------

/// POST /admin/create/forum
pub async fn create_forum(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidJson(input): ValidJson<CreateForum>,
) -> AppResult<impl IntoResponse> {
    let forum = state.store.create_forum(&input).await?;
    Ok(Json(Success::new(CreatedForum {
        message: format!("Forum '{}' created", forum.name),
        forum,
    })))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let users = state.store.list_users().await?;
    Ok(Json(Success::new(UserList { users })))
}

/// POST /admin/user
///
/// Register a user under their identity-provider id.
pub async fn create_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidJson(input): ValidJson<CreateUser>,
) -> AppResult<impl IntoResponse> {
    let user = state.store.create_user(&input).await?;
    Ok(Json(Success::new(CreatedUser {
        id: user.id,
        name: user.name,
        role: user.role,
    })))
}

/// POST /admin/ban-user
///
/// Apply a status change (`type`, where `REMOVE` restores `NORMAL`) and/or a
/// probation window (`duration`). `SUCCESS` when at least one applied.
pub async fn ban_user(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ValidJson(input): ValidJson<BanRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now().trunc_subsecs(6);
    let ban_type = input.ban_type.clone();
    let duration = input.duration.clone();
    let change: StandingChange = Box::new(move |s: &mut Standing| {
        s.apply_ban(ban_type.as_deref(), duration.as_deref(), now)
    });

    let body = moderate(&state, &input.id, change, "User standing updated").await?;
    tracing::info!(
        admin = %admin.user_id(),
        user_id = %input.id,
        ban_type = ?input.ban_type,
        duration = ?input.duration,
        outcome = ?body.status,
        "Moderation request",
    );
    Ok(Json(body))
}

/// POST /admin/user/role
pub async fn set_role(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ValidJson(input): ValidJson<RoleRequest>,
) -> AppResult<impl IntoResponse> {
    let role = input.role.clone();
    let change: StandingChange = Box::new(move |s: &mut Standing| s.request_role(&role));

    let body = moderate(&state, &input.id, change, "User role updated").await?;
    tracing::info!(
        admin = %admin.user_id(),
        user_id = %input.id,
        role = %input.role,
        outcome = ?body.status,
        "Role change request",
    );
    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

/// POST /admin/threads/{id}/lock
pub async fn lock_thread(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let thread = set_locked(&state, id, true).await?;
    Ok(Json(Success::new(ThreadBody { thread })))
}

/// POST /admin/threads/{id}/unlock
pub async fn unlock_thread(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let thread = set_locked(&state, id, false).await?;
    Ok(Json(Success::new(ThreadBody { thread })))
}
