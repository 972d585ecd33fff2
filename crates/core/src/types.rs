/// Access request and health record primary keys (UUID v7, time-ordered).
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
