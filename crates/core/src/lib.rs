//! Domain core for consent-based health record access.
//!
//! Everything here is transport- and storage-agnostic: the access-grant state
//! machine ([`grant::AccessGrantService`]), the grant-gated record facade
//! ([`gateway::RecordGateway`]), and the collaborator traits in [`ports`] that
//! the `db`, `delivery`, and `api` crates implement or consume.

pub mod access;
pub mod error;
pub mod gateway;
pub mod grant;
pub mod identity;
pub mod memory;
pub mod otp;
pub mod owner;
pub mod ports;
pub mod records;
pub mod roles;
pub mod types;
