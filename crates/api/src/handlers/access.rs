//! Handlers for the `/access` resource: the OTP consent handshake and the
//! grant-gated record endpoints.

use arogya_core::access::{AccessRequest, AccessStatus};
use arogya_core::owner::OwnerProfile;
use arogya_core::records::HealthRecord;
use arogya_core::types::{EntityId, Timestamp};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireClinician};
use crate::response::DataResponse;
use crate::state::AppState;

const OTP_SENT_MESSAGE: &str = "OTP sent to migrant phone";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /access/request`.
#[derive(Debug, Deserialize)]
pub struct RequestAccessInput {
    pub migrant_id: String,
}

/// Response payload for `POST /access/request`. Never carries the code.
#[derive(Debug, Serialize)]
pub struct RequestAccessResponse {
    pub request_id: EntityId,
    pub status: AccessStatus,
    pub otp_expires_at: Timestamp,
    pub message: &'static str,
}

/// Request body for `POST /access/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpInput {
    pub request_id: EntityId,
    pub otp: String,
}

/// Request body for `POST /access/health-records/{migrant_id}`.
#[derive(Debug, Deserialize)]
pub struct CreateRecordInput {
    pub title: String,
    pub content: String,
}

/// Query parameters for `GET /access/history/{migrant_id}`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// POST /api/v1/access/request
///
/// Open a pending request for the caller and text the OTP to the migrant.
pub async fn request_access(
    State(state): State<AppState>,
    RequireClinician(user): RequireClinician,
    Json(input): Json<RequestAccessInput>,
) -> AppResult<(StatusCode, Json<DataResponse<RequestAccessResponse>>)> {
    let request = state
        .grants
        .request_access(&input.migrant_id, &user.caller.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RequestAccessResponse {
                request_id: request.id,
                status: request.status,
                otp_expires_at: request.otp_expires_at,
                message: OTP_SENT_MESSAGE,
            },
        }),
    ))
}

/// POST /api/v1/access/verify
///
/// Submit the code the migrant read out. Only the requester (or an admin)
/// may verify a request.
pub async fn verify_otp(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<VerifyOtpInput>,
) -> AppResult<Json<DataResponse<AccessRequest>>> {
    state.grants.get_request(input.request_id, &user.caller).await?;
    let granted = state.grants.verify_otp(input.request_id, &input.otp).await?;
    Ok(Json(DataResponse { data: granted }))
}

/// GET /api/v1/access/requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<AccessRequest>>> {
    let request = state.grants.get_request(id, &user.caller).await?;
    Ok(Json(DataResponse { data: request }))
}

/// GET /api/v1/access/history/{migrant_id}?status=
///
/// The caller's own requests against one migrant, newest first.
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(migrant_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<AccessRequest>>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<AccessStatus>()
                .map_err(|_| AppError::BadRequest(format!("Unknown status filter '{s}'")))
        })
        .transpose()?;

    let requests = state
        .grants
        .history(&migrant_id, &user.caller.id, status)
        .await?;
    Ok(Json(DataResponse { data: requests }))
}

// ---------------------------------------------------------------------------
// Grant-gated endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/access/records/{migrant_id}
pub async fn list_records(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(migrant_id): Path<String>,
) -> AppResult<Json<DataResponse<Vec<HealthRecord>>>> {
    let records = state
        .gateway
        .read_records(&migrant_id, &user.caller.id)
        .await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/access/health-records/{migrant_id}
pub async fn create_record(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(migrant_id): Path<String>,
    Json(input): Json<CreateRecordInput>,
) -> AppResult<(StatusCode, Json<DataResponse<HealthRecord>>)> {
    let record = state
        .gateway
        .write_record(&migrant_id, &user.caller.id, &input.title, &input.content)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/v1/access/profile/{migrant_id}
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(migrant_id): Path<String>,
) -> AppResult<Json<DataResponse<OwnerProfile>>> {
    let profile = state
        .gateway
        .read_owner_profile(&migrant_id, &user.caller.id)
        .await?;
    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/access/aisummary/{migrant_id}
pub async fn ai_summary(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(migrant_id): Path<String>,
) -> AppResult<Json<DataResponse<SummaryResponse>>> {
    let summary = state
        .gateway
        .summarize(&migrant_id, &user.caller.id)
        .await?;
    Ok(Json(DataResponse {
        data: SummaryResponse { summary },
    }))
}
