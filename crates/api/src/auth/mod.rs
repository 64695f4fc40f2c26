//! Access-token verification.
//!
//! - [`verifier`] -- The [`TokenVerifier`] seam and the decoded token payload.
//! - [`jwks`] -- RS256 verification against the identity provider's key set.
//! - [`secret`] -- HS256 verification (and minting) with a shared secret.

pub mod jwks;
pub mod secret;
pub mod verifier;

pub use jwks::JwksVerifier;
pub use secret::SecretVerifier;
pub use verifier::{AccessClaims, TokenVerifier};
