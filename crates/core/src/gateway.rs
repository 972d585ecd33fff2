//! Grant-gated access to an owner's health records and profile.
//!
//! Every operation first asks [`AccessGrantService::current_grant`] whether
//! the requester holds a grant for the owner and fails `PermissionDenied`
//! otherwise.

use std::sync::Arc;

use crate::access::AccessRequest;
use crate::error::{CoreError, CoreResult};
use crate::grant::AccessGrantService;
use crate::owner::OwnerProfile;
use crate::ports::{OwnerDirectory, RecordStore, Summarizer};
use crate::records::{
    summary_input, HealthRecord, NewHealthRecord, SUMMARY_FALLBACK, SUMMARY_RECORD_LIMIT,
};

#[derive(Clone)]
pub struct RecordGateway {
    grants: AccessGrantService,
    records: Arc<dyn RecordStore>,
    owners: Arc<dyn OwnerDirectory>,
    summarizer: Arc<dyn Summarizer>,
}

impl RecordGateway {
    pub fn new(
        grants: AccessGrantService,
        records: Arc<dyn RecordStore>,
        owners: Arc<dyn OwnerDirectory>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            grants,
            records,
            owners,
            summarizer,
        }
    }

    /// The owner's records, newest first.
    pub async fn read_records(
        &self,
        owner_id: &str,
        requester_id: &str,
    ) -> CoreResult<Vec<HealthRecord>> {
        self.authorize(owner_id, requester_id).await?;
        self.records.list_for_owner(owner_id, None).await
    }

    /// Persist a record authored by the requester.
    pub async fn write_record(
        &self,
        owner_id: &str,
        requester_id: &str,
        title: &str,
        content: &str,
    ) -> CoreResult<HealthRecord> {
        self.authorize(owner_id, requester_id).await?;
        let record = NewHealthRecord::new(owner_id, requester_id, title, content)?.into_record();
        self.records.insert(&record).await?;

        tracing::info!(
            record_id = %record.id,
            owner_id,
            author_id = requester_id,
            "Health record created"
        );
        Ok(record)
    }

    /// Redacted owner profile.
    pub async fn read_owner_profile(
        &self,
        owner_id: &str,
        requester_id: &str,
    ) -> CoreResult<OwnerProfile> {
        self.authorize(owner_id, requester_id).await?;
        let owner = self
            .owners
            .find_owner(owner_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Owner", owner_id))?;
        Ok(OwnerProfile::from(&owner))
    }

    /// Summary of the owner's most recent records.
    ///
    /// A summarizer failure degrades to [`SUMMARY_FALLBACK`] instead of an error.
    pub async fn summarize(&self, owner_id: &str, requester_id: &str) -> CoreResult<String> {
        self.authorize(owner_id, requester_id).await?;
        let records = self
            .records
            .list_for_owner(owner_id, Some(SUMMARY_RECORD_LIMIT))
            .await?;
        let text = summary_input(&records);

        match self.summarizer.summarize(&text).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::warn!(owner_id, error = %e, "Summarization failed; returning fallback");
                Ok(SUMMARY_FALLBACK.to_string())
            }
        }
    }

    async fn authorize(&self, owner_id: &str, requester_id: &str) -> CoreResult<AccessRequest> {
        match self.grants.current_grant(owner_id, requester_id).await? {
            Some(grant) => {
                tracing::debug!(grant_id = %grant.id, owner_id, requester_id, "Access authorized");
                Ok(grant)
            }
            None => Err(CoreError::PermissionDenied("access not granted".into())),
        }
    }
}
