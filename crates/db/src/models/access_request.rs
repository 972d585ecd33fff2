//! Access request row and conversion into the domain entity.

use arogya_core::access::AccessRequest;
use arogya_core::error::CoreError;
use arogya_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

/// A row from the `access_requests` table.
#[derive(Debug, Clone, FromRow)]
pub struct AccessRequestRow {
    pub id: EntityId,
    pub owner_id: String,
    pub requester_id: String,
    pub otp_code: Option<String>,
    pub otp_expires_at: Timestamp,
    pub status: String,
    pub created_at: Timestamp,
    pub verified_at: Option<Timestamp>,
}

impl TryFrom<AccessRequestRow> for AccessRequest {
    type Error = CoreError;

    fn try_from(row: AccessRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            requester_id: row.requester_id,
            otp_code: row.otp_code,
            otp_expires_at: row.otp_expires_at,
            status: row.status.parse()?,
            created_at: row.created_at,
            verified_at: row.verified_at,
        })
    }
}
