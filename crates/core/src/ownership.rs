//! Post ownership check for edits and soft deletes.

use crate::auth::Claims;
use crate::error::CoreError;
use crate::types::DbId;

/// Admins may modify any post; everyone else only their own.
pub fn ensure_can_modify(claims: &Claims, author_id: &str, post_id: DbId) -> Result<(), CoreError> {
    if claims.admin || claims.user_id == author_id {
        Ok(())
    } else {
        Err(CoreError::NotOwner(format!(
            "User {} may not modify post {post_id}",
            claims.user_id
        )))
    }
}
