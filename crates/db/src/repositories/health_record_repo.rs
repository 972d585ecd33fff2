//! Repository for the `health_records` table.

use arogya_core::records::HealthRecord;
use sqlx::PgPool;

use crate::models::health_record::HealthRecordRow;

const COLUMNS: &str = "id, owner_id, title, content, author_id, version, created_at";

pub struct HealthRecordRepo;

impl HealthRecordRepo {
    pub async fn create(pool: &PgPool, input: &HealthRecord) -> Result<HealthRecordRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO health_records (id, owner_id, title, content, author_id, version, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HealthRecordRow>(&query)
            .bind(input.id)
            .bind(&input.owner_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.author_id)
            .bind(input.version)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Records for an owner, newest first. `limit = None` returns all rows
    /// (`LIMIT NULL` is `LIMIT ALL` in PostgreSQL).
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<HealthRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM health_records
             WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, HealthRecordRow>(&query)
            .bind(owner_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
