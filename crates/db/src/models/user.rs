//! User entity model and moderation DTOs.

use agora_core::limits::USER_NAME_MAX;
use agora_core::moderation::Standing;
use agora_core::roles::Role;
use agora_core::status::UserStatus;
use agora_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(try_from = "String")]
    pub status: UserStatus,
    #[serde(rename = "joinDate")]
    pub joined_at: Timestamp,
    #[serde(rename = "probationStartDate")]
    pub probation_start_date: Option<Timestamp>,
    #[serde(rename = "probationEndDate")]
    pub probation_end_date: Option<Timestamp>,
}

impl User {
    pub fn standing(&self) -> Standing {
        Standing {
            role: self.role,
            status: self.status,
            probation_start_date: self.probation_start_date,
            probation_end_date: self.probation_end_date,
        }
    }

    pub fn apply_standing(&mut self, standing: &Standing) {
        self.role = standing.role;
        self.status = standing.status;
        self.probation_start_date = standing.probation_start_date;
        self.probation_end_date = standing.probation_end_date;
    }
}

/// Display name of a user, for the batched author lookup.
#[derive(Debug, Clone, FromRow)]
pub struct UserName {
    pub id: UserId,
    pub name: String,
}

/// DTO for registering a user under their identity-provider id.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[serde(alias = "id")]
    #[validate(length(min = 1))]
    pub user_id: UserId,
    #[validate(length(min = 1, max = USER_NAME_MAX))]
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

/// Body of `POST /admin/ban-user`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BanRequest {
    #[validate(length(min = 1))]
    pub id: UserId,
    /// A status name or `REMOVE`.
    #[serde(rename = "type")]
    pub ban_type: Option<String>,
    /// A probation duration token such as `1 WEEK`.
    pub duration: Option<String>,
}

/// Body of `POST /admin/user/role`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleRequest {
    #[validate(length(min = 1))]
    pub id: UserId,
    pub role: String,
}
