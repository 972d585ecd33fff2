//! Staff user model and DTOs.

use arogya_core::identity::UserAccount;
use arogya_core::types::Timestamp;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            password_hash: row.password_hash,
        }
    }
}

/// DTO for creating a user. `password_hash` must already be Argon2id-hashed.
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub password_hash: String,
}
