//! Bearer-token guard for Axum handlers.

use std::marker::PhantomData;

use agora_core::auth::{authorize, bearer_token, AuthError, Claims};
use agora_core::permissions::Permission;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::rbac::RequiredPermission;
use crate::auth::TokenVerifier;
use crate::error::AppError;
use crate::state::AppState;

/// Run the full guard: parse the header, verify the token, build claims and
/// check `required`.
pub async fn guard(
    header: Option<&str>,
    verifier: &dyn TokenVerifier,
    required: Permission,
) -> Result<Claims, AuthError> {
    let token = bearer_token(header)?;
    let access = verifier.verify(token).await?;
    let claims = Claims::from_token(&access.sub, access.permissions)?;
    authorize(&claims, required)?;
    Ok(claims)
}

/// Caller whose token carries the permission named by `R`.
///
/// Declare the requirement in the handler signature:
///
/// ```ignore
/// async fn create_post(caller: Authorized<PostPost>) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %caller.claims.user_id, "posting");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authorized<R> {
    pub claims: Claims,
    _required: PhantomData<R>,
}

impl<R> Authorized<R> {
    pub fn user_id(&self) -> &str {
        &self.claims.user_id
    }
}

impl<R> FromRequestParts<AppState> for Authorized<R>
where
    R: RequiredPermission + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match guard(header, state.verifier.as_ref(), R::PERMISSION).await {
            Ok(claims) => Ok(Authorized {
                claims,
                _required: PhantomData,
            }),
            Err(err) => {
                if err.is_forbidden() {
                    tracing::warn!(error = %err, path = %parts.uri.path(), "Request forbidden");
                } else {
                    tracing::debug!(error = %err, path = %parts.uri.path(), "Request unauthorized");
                }
                Err(err.into())
            }
        }
    }
}
