use arogya_core::records::HealthRecord;
use arogya_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

/// A row from the `health_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct HealthRecordRow {
    pub id: EntityId,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub version: i32,
    pub created_at: Timestamp,
}

impl From<HealthRecordRow> for HealthRecord {
    fn from(row: HealthRecordRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            created_at: row.created_at,
            version: row.version,
        }
    }
}
