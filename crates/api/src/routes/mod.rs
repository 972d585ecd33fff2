pub mod access;
pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                          login (public)
///
/// /access/request                      open a request, send OTP (doctor, admin)
/// /access/verify                       verify OTP
/// /access/requests/{id}                request status (parties, admin)
/// /access/history/{migrant_id}         caller's requests for a migrant
/// /access/records/{migrant_id}         read records (grant)
/// /access/health-records/{migrant_id}  write a record (grant)
/// /access/profile/{migrant_id}         migrant profile (grant)
/// /access/aisummary/{migrant_id}       AI summary (grant)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/access", access::router())
}
