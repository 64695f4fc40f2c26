//! Moderation status of a user.

define_text_enum! {
    /// Stored in `users.status`.
    UserStatus {
        /// No restrictions.
        Normal = "NORMAL",
        /// Can neither read nor post.
        Banned = "BANNED",
        /// Read only.
        Probation = "PROBATION",
        Restricted = "RESTRICTED",
        /// Flags a problem user.
        Watch = "WATCH",
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Normal
    }
}

/// Transport-level value meaning "lift the current status".
pub const REMOVE_SENTINEL: &str = "REMOVE";

impl UserStatus {
    /// Resolve the `type` field of a ban request, where `REMOVE` stands for
    /// [`UserStatus::Normal`]. Returns `None` for unknown values.
    pub fn from_ban_type(raw: &str) -> Option<UserStatus> {
        if raw == REMOVE_SENTINEL {
            return Some(UserStatus::Normal);
        }
        raw.parse().ok()
    }
}
