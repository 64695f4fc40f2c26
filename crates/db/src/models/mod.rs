//! Entity models, DTOs and response views.
//!
//! Row structs derive `FromRow`. Views carry the JSON key names clients
//! expect (`forumId`, `dateCreated`, ...) and are what handlers serialize.

pub mod forum;
pub mod page;
pub mod post;
pub mod thread;
pub mod user;
