//! Repository for the `access_requests` table.

use arogya_core::access::{AccessRequest, STATUS_GRANTED, STATUS_PENDING};
use arogya_core::types::{EntityId, Timestamp};
use sqlx::PgPool;

use crate::models::access_request::AccessRequestRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, requester_id, otp_code, otp_expires_at, status, \
                       created_at, verified_at";

/// Append-only access request persistence.
pub struct AccessRequestRepo;

impl AccessRequestRepo {
    /// Insert a new pending request, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        input: &AccessRequest,
    ) -> Result<AccessRequestRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO access_requests
                 (id, owner_id, requester_id, otp_code, otp_expires_at, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessRequestRow>(&query)
            .bind(input.id)
            .bind(&input.owner_id)
            .bind(&input.requester_id)
            .bind(&input.otp_code)
            .bind(input.otp_expires_at)
            .bind(input.status.as_str())
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<AccessRequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM access_requests WHERE id = $1");
        sqlx::query_as::<_, AccessRequestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Conditionally move a request out of `pending`.
    ///
    /// The `status = 'pending'` predicate makes this a single-row
    /// compare-and-set: of any number of concurrent callers, at most one gets
    /// a row back. The OTP is cleared in the same statement, and
    /// `verified_at` is stamped only for a `granted` transition.
    pub async fn transition_if_pending(
        pool: &PgPool,
        id: EntityId,
        to: &str,
        at: Timestamp,
    ) -> Result<Option<AccessRequestRow>, sqlx::Error> {
        let query = format!(
            "UPDATE access_requests
             SET status = $2::TEXT,
                 otp_code = NULL,
                 verified_at = CASE WHEN $2::TEXT = '{STATUS_GRANTED}' THEN $3 ELSE verified_at END
             WHERE id = $1 AND status = '{STATUS_PENDING}'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessRequestRow>(&query)
            .bind(id)
            .bind(to)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// The granted request with the latest `verified_at` for a pair.
    pub async fn latest_grant(
        pool: &PgPool,
        owner_id: &str,
        requester_id: &str,
    ) -> Result<Option<AccessRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM access_requests
             WHERE owner_id = $1
               AND requester_id = $2
               AND status = '{STATUS_GRANTED}'
             ORDER BY verified_at DESC, created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, AccessRequestRow>(&query)
            .bind(owner_id)
            .bind(requester_id)
            .fetch_optional(pool)
            .await
    }

    /// Requests for a pair, newest first; `status = None` returns all.
    pub async fn list_for_pair(
        pool: &PgPool,
        owner_id: &str,
        requester_id: &str,
        status: Option<&str>,
    ) -> Result<Vec<AccessRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM access_requests
             WHERE owner_id = $1
               AND requester_id = $2
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AccessRequestRow>(&query)
            .bind(owner_id)
            .bind(requester_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }
}
