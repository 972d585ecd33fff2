//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod access_request_repo;
pub mod health_record_repo;
pub mod owner_repo;
pub mod user_repo;

pub use access_request_repo::AccessRequestRepo;
pub use health_record_repo::HealthRecordRepo;
pub use owner_repo::OwnerRepo;
pub use user_repo::UserRepo;
