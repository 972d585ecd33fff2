//! Collaborator interfaces consumed by the access core.
//!
//! Implementations live in other crates (`arogya-db` for Postgres,
//! `arogya-delivery` for SMS and summarization) or in [`crate::memory`].
//! All of them are held as `Arc<dyn Trait>` and injected at construction.

use async_trait::async_trait;

use crate::access::{AccessRequest, AccessStatus};
use crate::error::CoreResult;
use crate::identity::UserAccount;
use crate::owner::{ContactChannel, Owner};
use crate::records::HealthRecord;
use crate::types::{EntityId, Timestamp};

/// Append-only persistence for access requests.
#[async_trait]
pub trait AccessRequestStore: Send + Sync {
    async fn insert(&self, request: &AccessRequest) -> CoreResult<()>;

    async fn find_by_id(&self, id: EntityId) -> CoreResult<Option<AccessRequest>>;

    /// Move a request out of `pending`, atomically.
    ///
    /// Applies only if the stored row is still `pending`; returns the updated
    /// row, or `None` if the request is missing or already terminal. A
    /// `granted` transition stamps `verified_at = at`; every transition clears
    /// the stored OTP.
    async fn transition_if_pending(
        &self,
        id: EntityId,
        to: AccessStatus,
        at: Timestamp,
    ) -> CoreResult<Option<AccessRequest>>;

    /// The granted request with the latest `verified_at` for this pair.
    async fn latest_grant(
        &self,
        owner_id: &str,
        requester_id: &str,
    ) -> CoreResult<Option<AccessRequest>>;

    /// All requests for a pair, newest first, optionally filtered by status.
    async fn list_for_pair(
        &self,
        owner_id: &str,
        requester_id: &str,
        status: Option<AccessStatus>,
    ) -> CoreResult<Vec<AccessRequest>>;
}

/// Resolves owner identifiers to owners and their contact channels.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn find_owner(&self, owner_id: &str) -> CoreResult<Option<Owner>>;
}

/// Health record persistence, keyed by owner.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records for `owner_id`, newest first, truncated to `limit` if given.
    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: Option<usize>,
    ) -> CoreResult<Vec<HealthRecord>>;

    async fn insert(&self, record: &HealthRecord) -> CoreResult<()>;
}

/// Out-of-band delivery of one-time codes.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn deliver(&self, channel: &ContactChannel, message: &str) -> CoreResult<()>;
}

/// Free-text summarization (an external AI provider in production).
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> CoreResult<String>;
}

/// Staff accounts that can log in.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>>;
}
