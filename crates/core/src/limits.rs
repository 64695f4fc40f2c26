//! Field limits and fixed content.

pub const FORUM_NAME_MAX: u64 = 36;
pub const FORUM_DESCRIPTION_MAX: u64 = 120;
pub const THREAD_TITLE_MAX: u64 = 36;
pub const POST_CONTENT_MAX: u64 = 1024;
pub const USER_NAME_MAX: u64 = 36;

/// Content a soft-deleted post is left with.
pub const DELETED_POST_CONTENT: &str = "This post has been deleted.";
