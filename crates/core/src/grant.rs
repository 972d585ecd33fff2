//! The access-grant state machine.
//!
//! [`AccessGrantService`] is the only writer of access request status. It
//! opens requests (generating and delivering an OTP), verifies supplied
//! codes, and answers "does this requester currently hold a grant for this
//! owner?" for [`crate::gateway::RecordGateway`].
//!
//! Verification is linearizable per request: every status change goes
//! through [`AccessRequestStore::transition_if_pending`], so of two racing
//! `verify_otp` calls at most one performs a terminal transition and the
//! other observes `InvalidState` (or `Mismatch`, if its code was wrong).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::access::{AccessRequest, AccessStatus};
use crate::error::{CoreError, CoreResult};
use crate::identity::Caller;
use crate::otp::{codes_match, otp_message, OtpGenerator};
use crate::ports::{AccessRequestStore, NotificationPort, OwnerDirectory};
use crate::types::EntityId;

const ENTITY_ACCESS_REQUEST: &str = "Access request";
const ENTITY_OWNER: &str = "Owner";

/// How long `request_access` waits on OTP delivery before answering.
pub const DEFAULT_DELIVERY_WAIT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AccessGrantService {
    requests: Arc<dyn AccessRequestStore>,
    owners: Arc<dyn OwnerDirectory>,
    notifier: Arc<dyn NotificationPort>,
    otp: OtpGenerator,
    delivery_wait: Duration,
}

impl AccessGrantService {
    pub fn new(
        requests: Arc<dyn AccessRequestStore>,
        owners: Arc<dyn OwnerDirectory>,
        notifier: Arc<dyn NotificationPort>,
        otp: OtpGenerator,
    ) -> Self {
        Self {
            requests,
            owners,
            notifier,
            otp,
            delivery_wait: DEFAULT_DELIVERY_WAIT,
        }
    }

    /// Bound the time `request_access` spends waiting on the notifier.
    /// Delivery that outlives the wait keeps running in the background.
    pub fn with_delivery_wait(mut self, wait: Duration) -> Self {
        self.delivery_wait = wait;
        self
    }

    /// Open a pending access request and deliver its OTP to the owner.
    ///
    /// The returned request has its code stripped; the code only ever
    /// travels through the notification port. Delivery runs on its own task
    /// and is awaited for at most the configured delivery wait; failures are
    /// logged and swallowed. The request is persisted before delivery and its
    /// code stays valid for the whole window.
    pub async fn request_access(
        &self,
        owner_id: &str,
        requester_id: &str,
    ) -> CoreResult<AccessRequest> {
        let owner_id = owner_id.trim();
        let requester_id = requester_id.trim();
        if requester_id.is_empty() {
            return Err(CoreError::InvalidArgument(
                "Requester identity is required".into(),
            ));
        }
        if owner_id.is_empty() {
            return Err(CoreError::InvalidArgument("Owner id is required".into()));
        }

        let owner = self
            .owners
            .find_owner(owner_id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY_OWNER, owner_id))?;

        let now = Utc::now();
        let otp = self.otp.generate_at(now);
        let request = AccessRequest::pending(
            Uuid::now_v7(),
            owner_id,
            requester_id,
            otp.code.clone(),
            otp.expires_at,
            now,
        );
        self.requests.insert(&request).await?;

        tracing::info!(
            request_id = %request.id,
            owner_id,
            requester_id,
            expires_at = %request.otp_expires_at,
            "Access request opened"
        );

        let notifier = Arc::clone(&self.notifier);
        let channel = owner.contact_channel();
        let message = otp_message(&otp.code);
        let request_id = request.id;
        let delivery = tokio::spawn(async move {
            if let Err(e) = notifier.deliver(&channel, &message).await {
                tracing::warn!(
                    %request_id,
                    channel = %channel.masked(),
                    error = %e,
                    "OTP delivery failed; request remains verifiable"
                );
            }
        });

        match tokio::time::timeout(self.delivery_wait, delivery).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(request_id = %request.id, error = %e, "OTP delivery task aborted");
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %request.id,
                    wait_ms = self.delivery_wait.as_millis() as u64,
                    "OTP delivery still in flight; continuing in background"
                );
            }
        }

        Ok(AccessRequest {
            otp_code: None,
            ..request
        })
    }

    /// Check `supplied_code` against a pending request.
    ///
    /// In order: unknown id is `NotFound`; a non-pending request is
    /// `InvalidState`; a closed window moves the request to `expired` and
    /// fails `Expired`; a wrong code fails `Mismatch` and leaves the request
    /// pending; otherwise the request becomes `granted`.
    pub async fn verify_otp(
        &self,
        request_id: EntityId,
        supplied_code: &str,
    ) -> CoreResult<AccessRequest> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY_ACCESS_REQUEST, request_id))?;

        if request.status != AccessStatus::Pending {
            return Err(not_pending(&request));
        }

        let now = Utc::now();
        if request.is_expired_at(now) {
            return match self
                .requests
                .transition_if_pending(request_id, AccessStatus::Expired, now)
                .await?
            {
                Some(_) => {
                    tracing::info!(request_id = %request_id, "Access request expired");
                    Err(CoreError::Expired)
                }
                None => Err(self.lost_race(request_id).await),
            };
        }

        let matches = request
            .otp_code
            .as_deref()
            .is_some_and(|code| codes_match(code, supplied_code.trim()));
        if !matches {
            tracing::info!(request_id = %request_id, "OTP mismatch");
            return Err(CoreError::Mismatch);
        }

        match self
            .requests
            .transition_if_pending(request_id, AccessStatus::Granted, now)
            .await?
        {
            Some(granted) => {
                tracing::info!(
                    request_id = %request_id,
                    owner_id = %granted.owner_id,
                    requester_id = %granted.requester_id,
                    "Access granted"
                );
                Ok(granted)
            }
            None => Err(self.lost_race(request_id).await),
        }
    }

    /// The grant with the latest `verified_at` for this pair, if any.
    ///
    /// Pure read; grants do not lapse once verified.
    pub async fn current_grant(
        &self,
        owner_id: &str,
        requester_id: &str,
    ) -> CoreResult<Option<AccessRequest>> {
        self.requests.latest_grant(owner_id, requester_id).await
    }

    /// Look up a request on behalf of one of its parties (or an admin).
    pub async fn get_request(
        &self,
        request_id: EntityId,
        caller: &Caller,
    ) -> CoreResult<AccessRequest> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY_ACCESS_REQUEST, request_id))?;

        if !caller.is_admin() && !request.involves(&caller.id) {
            return Err(CoreError::PermissionDenied(
                "Not a party to this access request".into(),
            ));
        }
        Ok(request)
    }

    /// Request history for a pair, newest first.
    pub async fn history(
        &self,
        owner_id: &str,
        requester_id: &str,
        status: Option<AccessStatus>,
    ) -> CoreResult<Vec<AccessRequest>> {
        self.requests
            .list_for_pair(owner_id, requester_id, status)
            .await
    }

    /// Build the error for a conditional update that found the row already terminal.
    async fn lost_race(&self, request_id: EntityId) -> CoreError {
        match self.requests.find_by_id(request_id).await {
            Ok(Some(current)) => {
                tracing::debug!(
                    request_id = %request_id,
                    status = %current.status,
                    "Concurrent verification won the transition"
                );
                not_pending(&current)
            }
            Ok(None) => CoreError::not_found(ENTITY_ACCESS_REQUEST, request_id),
            Err(e) => e,
        }
    }
}

fn not_pending(request: &AccessRequest) -> CoreError {
    CoreError::InvalidState(format!(
        "Access request is {}, not pending",
        request.status
    ))
}
