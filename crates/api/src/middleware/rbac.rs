//! Permission markers for [`Authorized`].
//!
//! Each marker names exactly one [`Permission`]. Admins pass every check.

use agora_core::permissions::Permission;

use super::auth::Authorized;

/// Type-level name of the permission an endpoint requires.
pub trait RequiredPermission {
    const PERMISSION: Permission;
}

macro_rules! permission_marker {
    ($($marker:ident => $permission:ident),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $marker;

            impl RequiredPermission for $marker {
                const PERMISSION: Permission = Permission::$permission;
            }
        )+
    };
}

permission_marker! {
    Admin => Admin,
    PostThread => PostThread,
    PostPost => PostPost,
    EditPost => EditPost,
    DeletePost => DeletePost,
}

pub type RequireAdmin = Authorized<Admin>;
pub type CanPostThread = Authorized<PostThread>;
pub type CanPostPost = Authorized<PostPost>;
pub type CanEditPost = Authorized<EditPost>;
pub type CanDeletePost = Authorized<DeletePost>;
