//! HS256 access tokens signed with a shared secret.
//!
//! Used for local development and the test suite, where no identity
//! provider is reachable. Audience and issuer are still enforced.

use agora_core::auth::AuthError;
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use super::verifier::{AccessClaims, TokenVerifier};

/// Default lifetime of minted tokens in minutes.
const DEFAULT_EXPIRY_MINS: i64 = 15;

pub struct SecretVerifier {
    secret: String,
    issuer: String,
    audience: String,
}

/// Wire form of a minted token: the claims plus audience and issuer.
#[derive(Serialize)]
struct SignedClaims<'a> {
    #[serde(flatten)]
    claims: &'a AccessClaims,
    iss: &'a str,
    aud: &'a str,
}

impl SecretVerifier {
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Mint a token for `sub` carrying `permissions`, valid for 15 minutes.
    ///
    /// Pass `None` to produce a token with no permissions claim at all.
    pub fn issue(
        &self,
        sub: &str,
        permissions: Option<&[&str]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims {
            sub: sub.to_string(),
            permissions: permissions.map(|p| p.iter().map(|s| s.to_string()).collect()),
            exp: now + DEFAULT_EXPIRY_MINS * 60,
            iat: now,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims, e.g. an already-expired payload.
    pub fn sign(&self, claims: &AccessClaims) -> Result<String, jsonwebtoken::errors::Error> {
        let signed = SignedClaims {
            claims,
            iss: &self.issuer,
            aud: &self.audience,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &signed,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation
    }
}

#[async_trait]
impl TokenVerifier for SecretVerifier {
    async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected HS256 token");
            AuthError::InvalidToken
        })
    }
}
