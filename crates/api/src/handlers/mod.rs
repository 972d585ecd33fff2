//! Request handlers.
//!
//! Handlers delegate to the services in [`crate::state::AppState`] and map
//! errors via [`crate::error::AppError`].

pub mod access;
pub mod auth;
pub mod health;
