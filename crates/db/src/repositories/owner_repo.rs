//! Repository for the `migrants` table.

use sqlx::PgPool;

use crate::models::owner::{CreateOwner, OwnerRow};

const COLUMNS: &str = "unique_id, name, phone, dob, gender, language, is_verified, \
                       password_hash, created_at, updated_at";

pub struct OwnerRepo;

impl OwnerRepo {
    pub async fn create(pool: &PgPool, input: &CreateOwner) -> Result<OwnerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO migrants
                 (unique_id, name, phone, dob, gender, language, is_verified, password_hash)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'ml'), $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OwnerRow>(&query)
            .bind(&input.unique_id)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(input.dob)
            .bind(&input.gender)
            .bind(&input.language)
            .bind(input.is_verified)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_unique_id(
        pool: &PgPool,
        unique_id: &str,
    ) -> Result<Option<OwnerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM migrants WHERE unique_id = $1");
        sqlx::query_as::<_, OwnerRow>(&query)
            .bind(unique_id)
            .fetch_optional(pool)
            .await
    }
}
