//! Postgres-backed implementations of the `arogya_core::ports` traits.
//!
//! Each adapter owns a pool handle and delegates to the matching repository,
//! converting rows into domain entities and `sqlx::Error` into
//! [`CoreError::Internal`].

use arogya_core::access::{AccessRequest, AccessStatus};
use arogya_core::error::{CoreError, CoreResult};
use arogya_core::identity::UserAccount;
use arogya_core::owner::Owner;
use arogya_core::ports::{AccessRequestStore, OwnerDirectory, RecordStore, UserDirectory};
use arogya_core::records::HealthRecord;
use arogya_core::types::{EntityId, Timestamp};
use async_trait::async_trait;

use crate::repositories::{AccessRequestRepo, HealthRecordRepo, OwnerRepo, UserRepo};
use crate::DbPool;

fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("Database error: {err}"))
}

#[derive(Clone)]
pub struct PgAccessRequestStore {
    pool: DbPool,
}

impl PgAccessRequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRequestStore for PgAccessRequestStore {
    async fn insert(&self, request: &AccessRequest) -> CoreResult<()> {
        AccessRequestRepo::create(&self.pool, request)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: EntityId) -> CoreResult<Option<AccessRequest>> {
        AccessRequestRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
            .map(AccessRequest::try_from)
            .transpose()
    }

    async fn transition_if_pending(
        &self,
        id: EntityId,
        to: AccessStatus,
        at: Timestamp,
    ) -> CoreResult<Option<AccessRequest>> {
        if !AccessStatus::Pending.can_transition_to(to) {
            return Err(CoreError::InvalidArgument(format!(
                "Cannot transition an access request to {to}"
            )));
        }
        AccessRequestRepo::transition_if_pending(&self.pool, id, to.as_str(), at)
            .await
            .map_err(storage_error)?
            .map(AccessRequest::try_from)
            .transpose()
    }

    async fn latest_grant(
        &self,
        owner_id: &str,
        requester_id: &str,
    ) -> CoreResult<Option<AccessRequest>> {
        AccessRequestRepo::latest_grant(&self.pool, owner_id, requester_id)
            .await
            .map_err(storage_error)?
            .map(AccessRequest::try_from)
            .transpose()
    }

    async fn list_for_pair(
        &self,
        owner_id: &str,
        requester_id: &str,
        status: Option<AccessStatus>,
    ) -> CoreResult<Vec<AccessRequest>> {
        AccessRequestRepo::list_for_pair(
            &self.pool,
            owner_id,
            requester_id,
            status.map(AccessStatus::as_str),
        )
        .await
        .map_err(storage_error)?
        .into_iter()
        .map(AccessRequest::try_from)
        .collect()
    }
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: Option<usize>,
    ) -> CoreResult<Vec<HealthRecord>> {
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let rows = HealthRecordRepo::list_for_owner(&self.pool, owner_id, limit)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(HealthRecord::from).collect())
    }

    async fn insert(&self, record: &HealthRecord) -> CoreResult<()> {
        HealthRecordRepo::create(&self.pool, record)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgOwnerDirectory {
    pool: DbPool,
}

impl PgOwnerDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerDirectory for PgOwnerDirectory {
    async fn find_owner(&self, owner_id: &str) -> CoreResult<Option<Owner>> {
        Ok(OwnerRepo::find_by_unique_id(&self.pool, owner_id)
            .await
            .map_err(storage_error)?
            .map(Owner::from))
    }
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>> {
        Ok(UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(storage_error)?
            .map(UserAccount::from))
    }
}
