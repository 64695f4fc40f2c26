//! Authorization guard.
//!
//! Turns a verified token payload into [`Claims`] and decides whether those
//! claims satisfy a required [`Permission`]. Token signature verification is
//! not done here; callers hand in what their verifier produced.

use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::permissions::Permission;
use crate::types::UserId;

/// The verified attributes of a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Local id taken from the provider subject (`"<issuer-prefix>|<local-id>"`).
    pub user_id: UserId,
    pub permissions: BTreeSet<String>,
    /// True iff `"admin"` is among the permissions.
    pub admin: bool,
}

impl Claims {
    /// Build claims from a provider subject and the token's permission list.
    ///
    /// `permissions` is `None` when the token carried no permissions claim at
    /// all, which is rejected.
    pub fn from_token<I>(subject: &str, permissions: Option<I>) -> Result<Claims, AuthError>
    where
        I: IntoIterator<Item = String>,
    {
        let permissions: BTreeSet<String> = permissions
            .ok_or(AuthError::MissingPermissions)?
            .into_iter()
            .collect();

        let user_id = subject
            .split('|')
            .nth(1)
            .filter(|local| !local.is_empty())
            .ok_or_else(|| AuthError::MalformedClaims(subject.to_string()))?;

        let admin = permissions.contains(Permission::Admin.as_str());

        Ok(Claims {
            user_id: user_id.to_string(),
            permissions,
            admin,
        })
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(permission.as_str())
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("No authorization provided")]
    MissingToken,

    #[error("Malformed authorization header")]
    MalformedHeader,

    #[error("Token expired or could not be verified")]
    InvalidToken,

    #[error("Permissions not included in token")]
    MissingPermissions,

    #[error("Malformed subject claim '{0}'")]
    MalformedClaims(String),

    #[error("Missing required permission '{0}'")]
    Forbidden(Permission),
}

impl AuthError {
    /// Whether this denial is a 403 rather than a 401.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::Forbidden(_))
    }
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        if err.is_forbidden() {
            CoreError::Forbidden(err.to_string())
        } else {
            CoreError::Unauthorized(err.to_string())
        }
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly two space-separated parts, the first being
/// `bearer` in any case.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let parts: Vec<&str> = header.split(' ').collect();

    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token)
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Decide whether `claims` may perform an action requiring `required`.
pub fn authorize(claims: &Claims, required: Permission) -> Result<(), AuthError> {
    if claims.admin || claims.has(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(required))
    }
}
