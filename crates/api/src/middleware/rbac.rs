//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement.

use arogya_core::error::CoreError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `doctor` or `admin` role. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn clinician_only(RequireClinician(user): RequireClinician) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireClinician(pub AuthUser);

impl FromRequestParts<AppState> for RequireClinician {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.caller.is_clinician() {
            return Err(AppError::Core(CoreError::PermissionDenied(
                "Doctor or Admin role required".into(),
            )));
        }
        Ok(RequireClinician(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for routes
/// where the grant check, not the role, decides access.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
