//! Authorization extractors.
//!
//! - [`auth::Authorized`] -- Verifies the bearer token and checks one permission.
//! - [`rbac`] -- Permission marker types and the per-endpoint aliases
//!   ([`rbac::RequireAdmin`], [`rbac::CanPostThread`], ...).

pub mod auth;
pub mod rbac;
