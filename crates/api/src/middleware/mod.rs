//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated caller from a JWT Bearer token.
//! - [`rbac::RequireClinician`] -- Requires the `doctor` or `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
pub mod rbac;
