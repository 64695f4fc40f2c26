//! Forum roles.

define_text_enum! {
    /// Authority level of a forum user. Stored in `users.role`.
    Role {
        Admin = "ADMIN",
        Moderator = "MODERATOR",
        User = "USER",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}
