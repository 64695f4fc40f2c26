//! Domain rules for the Agora forum backend.
//!
//! Everything in this crate is pure: no I/O, no persistence, no HTTP. The
//! store and API crates call into these rules and own the side effects.

#[macro_use]
mod macros;

pub mod auth;
pub mod error;
pub mod limits;
pub mod moderation;
pub mod ownership;
pub mod pagination;
pub mod permissions;
pub mod probation;
pub mod roles;
pub mod status;
pub mod types;
