//! Request handlers, one module per resource.

pub mod admin;
pub mod forum;
pub mod thread;
