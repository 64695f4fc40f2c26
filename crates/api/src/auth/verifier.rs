use agora_core::auth::AuthError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Claims read from a verified access token.
///
/// `aud` and `iss` are checked during verification and not kept here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Provider subject, `"<issuer-prefix>|<local-id>"`.
    pub sub: String,
    /// Absent when the provider did not include permissions in the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    #[serde(default)]
    pub iat: i64,
}

/// Validates a bearer token and returns its claims.
///
/// Any failure (bad signature, expired, wrong audience or issuer, key set
/// unavailable) is reported as [`AuthError::InvalidToken`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError>;
}
