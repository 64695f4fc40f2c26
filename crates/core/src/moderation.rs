//! User standing and the moderation transitions on it.
//!
//! The transitions mutate a [`Standing`] in place and report whether
//! anything changed. Persisting the result is up to the caller.

use serde::Serialize;

use crate::error::CoreError;
use crate::probation::ProbationDuration;
use crate::roles::Role;
use crate::status::UserStatus;
use crate::types::Timestamp;

/// Result of a moderation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Success,
    Failed,
}

impl Outcome {
    pub fn applied(self) -> bool {
        self == Outcome::Success
    }

    /// `Success` if either side applied.
    pub fn or(self, other: Outcome) -> Outcome {
        if self.applied() || other.applied() {
            Outcome::Success
        } else {
            Outcome::Failed
        }
    }
}

/// The moderation-relevant part of a user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Standing {
    pub role: Role,
    pub status: UserStatus,
    pub probation_start_date: Option<Timestamp>,
    pub probation_end_date: Option<Timestamp>,
}

impl Standing {
    pub fn set_status(&mut self, status: UserStatus) -> Outcome {
        if self.status == status {
            return Outcome::Failed;
        }
        self.status = status;
        Outcome::Success
    }

    pub fn set_role(&mut self, role: Role) -> Outcome {
        if self.role == role {
            return Outcome::Failed;
        }
        self.role = role;
        Outcome::Success
    }

    /// [`Standing::set_status`] from a raw ban `type`, honouring the
    /// `REMOVE` sentinel. Unknown values fail without mutation.
    pub fn request_status(&mut self, raw: &str) -> Outcome {
        match UserStatus::from_ban_type(raw) {
            Some(status) => self.set_status(status),
            None => Outcome::Failed,
        }
    }

    /// [`Standing::set_role`] from a raw role name.
    pub fn request_role(&mut self, raw: &str) -> Outcome {
        match raw.parse::<Role>() {
            Ok(role) => self.set_role(role),
            Err(_) => Outcome::Failed,
        }
    }

    /// Start a probation window at `now` for the given duration token.
    pub fn set_probation(&mut self, token: &str, now: Timestamp) -> Outcome {
        let Ok(duration) = token.parse::<ProbationDuration>() else {
            return Outcome::Failed;
        };
        let Some(end) = duration.end_from(now) else {
            return Outcome::Failed;
        };
        self.probation_start_date = Some(now);
        self.probation_end_date = Some(end);
        Outcome::Success
    }

    /// A ban request: an optional status change (`REMOVE` restores
    /// `NORMAL`) and an optional probation window. `Success` if either applied.
    pub fn apply_ban(
        &mut self,
        ban_type: Option<&str>,
        duration: Option<&str>,
        now: Timestamp,
    ) -> Outcome {
        let mut outcome = Outcome::Failed;
        if let Some(ban_type) = ban_type {
            outcome = outcome.or(self.request_status(ban_type));
        }
        if let Some(duration) = duration {
            outcome = outcome.or(self.set_probation(duration, now));
        }
        outcome
    }

    /// Whether `now` falls inside `[probation_start_date, probation_end_date)`.
    pub fn on_probation(&self, now: Timestamp) -> bool {
        match (self.probation_start_date, self.probation_end_date) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }

    /// Banned users and users inside a probation window cannot post.
    pub fn may_post(&self, now: Timestamp) -> bool {
        self.status != UserStatus::Banned && !self.on_probation(now)
    }
}

/// Posting rules shared by every store.
///
/// `author` is `None` when the author has no user record.
pub fn ensure_may_post(
    thread_locked: bool,
    author: Option<&Standing>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if thread_locked {
        return Err(CoreError::Unprocessable("Thread is locked".into()));
    }
    match author {
        None => Err(CoreError::Forbidden("Author is not a registered user".into())),
        Some(standing) if !standing.may_post(now) => Err(CoreError::Forbidden(
            "Author is banned or on probation".into(),
        )),
        Some(_) => Ok(()),
    }
}
