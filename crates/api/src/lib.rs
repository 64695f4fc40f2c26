//! HTTP surface of the Agora forum backend.
//!
//! The binary in `main.rs` and the integration tests both build the app
//! through [`router::build_app_router`].

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
