//! Route definitions for the `/access` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::access;
use crate::state::AppState;

/// Routes mounted at `/access`.
///
/// ```text
/// POST /request                       -> request_access (doctor, admin)
/// POST /verify                        -> verify_otp
/// GET  /requests/{id}                 -> get_request
/// GET  /history/{migrant_id}          -> history
/// GET  /records/{migrant_id}          -> list_records (grant required)
/// POST /health-records/{migrant_id}   -> create_record (grant required)
/// GET  /profile/{migrant_id}          -> get_profile (grant required)
/// GET  /aisummary/{migrant_id}        -> ai_summary (grant required)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(access::request_access))
        .route("/verify", post(access::verify_otp))
        .route("/requests/{id}", get(access::get_request))
        .route("/history/{migrant_id}", get(access::history))
        .route("/records/{migrant_id}", get(access::list_records))
        .route("/health-records/{migrant_id}", post(access::create_record))
        .route("/profile/{migrant_id}", get(access::get_profile))
        .route("/aisummary/{migrant_id}", get(access::ai_summary))
}
