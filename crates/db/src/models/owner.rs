//! Migrant (record owner) model and DTOs.

use arogya_core::owner::Owner;
use arogya_core::types::Timestamp;
use chrono::NaiveDate;
use sqlx::FromRow;

/// A row from the `migrants` table.
#[derive(Debug, Clone, FromRow)]
pub struct OwnerRow {
    pub unique_id: String,
    pub name: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub language: String,
    pub is_verified: bool,
    pub password_hash: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<OwnerRow> for Owner {
    fn from(row: OwnerRow) -> Self {
        Self {
            unique_id: row.unique_id,
            name: row.name,
            phone: row.phone,
            dob: row.dob,
            gender: row.gender,
            language: row.language,
            is_verified: row.is_verified,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// DTO for inserting a migrant. `language` falls back to the column default.
pub struct CreateOwner {
    pub unique_id: String,
    pub name: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub language: Option<String>,
    pub is_verified: bool,
    pub password_hash: Option<String>,
}
