//! Access request entity and its status lifecycle.
//!
//! ```text
//! pending ──► granted
//!    │
//!    ├──────► expired
//!    │
//!    └──────► denied
//! ```
//!
//! `pending` is the only non-terminal status. Once a request leaves it the
//! row is frozen: the OTP is cleared and no further transition is accepted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_GRANTED: &str = "granted";
pub const STATUS_DENIED: &str = "denied";
pub const STATUS_EXPIRED: &str = "expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    Pending,
    Granted,
    Denied,
    Expired,
}

impl AccessStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Granted => STATUS_GRANTED,
            Self::Denied => STATUS_DENIED,
            Self::Expired => STATUS_EXPIRED,
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Transitions are one-directional: only `pending` may move, and only
    /// into a terminal status.
    pub const fn can_transition_to(self, next: AccessStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_GRANTED => Ok(Self::Granted),
            STATUS_DENIED => Ok(Self::Denied),
            STATUS_EXPIRED => Ok(Self::Expired),
            other => Err(CoreError::Internal(format!(
                "Unknown access request status '{other}'"
            ))),
        }
    }
}

/// One consent handshake between a requester and a record owner.
///
/// Rows are append-only: they are never deleted, and only the status,
/// `verified_at`, and `otp_code` fields ever change (exactly once, on the
/// transition out of `pending`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRequest {
    pub id: EntityId,
    /// Public identifier of the record owner.
    pub owner_id: String,
    /// Identity of the party asking for access.
    pub requester_id: String,
    /// Never serialized; the code only travels through the notification port.
    #[serde(skip_serializing)]
    pub otp_code: Option<String>,
    pub otp_expires_at: Timestamp,
    pub status: AccessStatus,
    pub created_at: Timestamp,
    pub verified_at: Option<Timestamp>,
}

impl AccessRequest {
    /// Build a new pending request.
    pub fn pending(
        id: EntityId,
        owner_id: impl Into<String>,
        requester_id: impl Into<String>,
        otp_code: impl Into<String>,
        otp_expires_at: Timestamp,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            requester_id: requester_id.into(),
            otp_code: Some(otp_code.into()),
            otp_expires_at,
            status: AccessStatus::Pending,
            created_at,
            verified_at: None,
        }
    }

    /// The OTP window is closed at and after `otp_expires_at`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.otp_expires_at
    }

    pub fn is_grant(&self) -> bool {
        self.status == AccessStatus::Granted && self.verified_at.is_some()
    }

    /// Returns `true` if `user_id` is either party of this request.
    pub fn involves(&self, user_id: &str) -> bool {
        self.owner_id == user_id || self.requester_id == user_id
    }

    /// Apply a terminal transition in place.
    ///
    /// Returns `false` (and leaves the row untouched) if the request is no
    /// longer pending. Stores use this as their compare-and-set primitive.
    pub fn apply_transition(&mut self, to: AccessStatus, at: Timestamp) -> bool {
        if !self.status.can_transition_to(to) {
            return false;
        }
        self.status = to;
        self.otp_code = None;
        if to == AccessStatus::Granted {
            self.verified_at = Some(at);
        }
        true
    }
}
