//! In-process implementations of the collaborator ports.
//!
//! Used when no `DATABASE_URL` is configured and throughout the test suites.
//! Every store keeps its rows behind a single `tokio::sync::RwLock`, so the
//! check-then-write in [`MemoryAccessRequestStore::transition_if_pending`]
//! runs entirely under one write guard.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::access::{AccessRequest, AccessStatus};
use crate::error::{CoreError, CoreResult};
use crate::identity::UserAccount;
use crate::owner::{ContactChannel, Owner};
use crate::ports::{
    AccessRequestStore, NotificationPort, OwnerDirectory, RecordStore, UserDirectory,
};
use crate::records::HealthRecord;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Access requests
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryAccessRequestStore {
    rows: RwLock<HashMap<EntityId, AccessRequest>>,
}

impl MemoryAccessRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessRequestStore for MemoryAccessRequestStore {
    async fn insert(&self, request: &AccessRequest) -> CoreResult<()> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&request.id) {
            return Err(CoreError::Internal(format!(
                "Duplicate access request id {}",
                request.id
            )));
        }
        rows.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: EntityId) -> CoreResult<Option<AccessRequest>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn transition_if_pending(
        &self,
        id: EntityId,
        to: AccessStatus,
        at: Timestamp,
    ) -> CoreResult<Option<AccessRequest>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if row.apply_transition(to, at) {
            Ok(Some(row.clone()))
        } else {
            Ok(None)
        }
    }

    async fn latest_grant(
        &self,
        owner_id: &str,
        requester_id: &str,
    ) -> CoreResult<Option<AccessRequest>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|r| r.owner_id == owner_id && r.requester_id == requester_id)
            .filter(|r| r.is_grant())
            .max_by_key(|r| (r.verified_at, r.created_at))
            .cloned())
    }

    async fn list_for_pair(
        &self,
        owner_id: &str,
        requester_id: &str,
        status: Option<AccessStatus>,
    ) -> CoreResult<Vec<AccessRequest>> {
        let rows = self.rows.read().await;
        let mut matching: Vec<AccessRequest> = rows
            .values()
            .filter(|r| r.owner_id == owner_id && r.requester_id == requester_id)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }
}

// ---------------------------------------------------------------------------
// Health records
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<HealthRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: Option<usize>,
    ) -> CoreResult<Vec<HealthRecord>> {
        let rows = self.rows.read().await;
        let mut records: Vec<HealthRecord> = rows
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        // UUID v7 ids are time-ordered, which breaks ties within one clock tick.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn insert(&self, record: &HealthRecord) -> CoreResult<()> {
        self.rows.write().await.push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Directories
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryOwnerDirectory {
    owners: RwLock<HashMap<String, Owner>>,
}

impl MemoryOwnerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an owner, keyed by its public id.
    pub async fn upsert(&self, owner: Owner) {
        self.owners
            .write()
            .await
            .insert(owner.unique_id.clone(), owner);
    }
}

#[async_trait]
impl OwnerDirectory for MemoryOwnerDirectory {
    async fn find_owner(&self, owner_id: &str) -> CoreResult<Option<Owner>> {
        Ok(self.owners.read().await.get(owner_id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<String, UserAccount>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account, keyed by lowercased email.
    pub async fn upsert(&self, user: UserAccount) {
        self.users
            .write()
            .await
            .insert(user.email.to_lowercase(), user);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(&email.to_lowercase()).cloned())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A message accepted by [`OutboxNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxMessage {
    pub channel: ContactChannel,
    pub body: String,
}

/// Notification port that records every delivery instead of sending it.
///
/// Can be switched into a failing mode to exercise the delivery-failure path.
#[derive(Debug, Default)]
pub struct OutboxNotifier {
    sent: Mutex<Vec<OutboxMessage>>,
    fail: AtomicBool,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<OutboxMessage> {
        self.sent.lock().await.clone()
    }

    /// Body of the most recent message sent to `channel`.
    pub async fn last_to(&self, channel: &ContactChannel) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| &m.channel == channel)
            .map(|m| m.body.clone())
    }
}

#[async_trait]
impl NotificationPort for OutboxNotifier {
    async fn deliver(&self, channel: &ContactChannel, message: &str) -> CoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Unavailable(format!(
                "Delivery to {} refused",
                channel.masked()
            )));
        }
        self.sent.lock().await.push(OutboxMessage {
            channel: channel.clone(),
            body: message.to_string(),
        });
        Ok(())
    }
}
