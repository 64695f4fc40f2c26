//! Permission strings carried in access tokens.

define_text_enum! {
    /// A permission granted by the identity provider.
    Permission {
        /// Grants everything; holders bypass specific checks.
        Admin = "admin",
        PostThread = "post:thread",
        PostPost = "post:post",
        EditPost = "edit:post",
        DeletePost = "delete:post",
    }
}
