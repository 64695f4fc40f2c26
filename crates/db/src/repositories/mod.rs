//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods over any
//! PostgreSQL executor, so the same query runs against the pool or inside a
//! transaction.

pub mod forum_repo;
pub mod page_repo;
pub mod post_repo;
pub mod thread_repo;
pub mod user_repo;

pub use forum_repo::ForumRepo;
pub use page_repo::PageRepo;
pub use post_repo::PostRepo;
pub use thread_repo::ThreadRepo;
pub use user_repo::UserRepo;
