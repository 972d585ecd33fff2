//! Health records and the summarization input builder.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CoreError, CoreResult};
use crate::types::{EntityId, Timestamp};

/// Maximum number of records fed to the summarizer.
pub const SUMMARY_RECORD_LIMIT: usize = 10;

/// Text sent to the summarizer when the owner has no records.
pub const EMPTY_SUMMARY_INPUT: &str = "No records";

/// Returned in place of a summary when the summarizer fails.
pub const SUMMARY_FALLBACK: &str = "Failed to generate summary.";

/// Upper bound on [`NewHealthRecord::title`], in characters.
pub const MAX_TITLE_LENGTH: u64 = 200;

/// Initial version stamped on new records.
pub const INITIAL_RECORD_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthRecord {
    pub id: EntityId,
    pub owner_id: String,
    pub title: String,
    /// Free text: clinical note, test results, or a prescription.
    pub content: String,
    pub author_id: String,
    pub created_at: Timestamp,
    pub version: i32,
}

/// Validated input for a new record.
#[derive(Debug, Clone, Validate)]
pub struct NewHealthRecord {
    #[validate(length(min = 1, message = "owner id is required"))]
    pub owner_id: String,
    #[validate(length(min = 1, message = "author id is required"))]
    pub author_id: String,
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 20000, message = "content must be 1-20000 characters"))]
    pub content: String,
}

impl NewHealthRecord {
    /// Trim and validate the input fields.
    pub fn new(
        owner_id: &str,
        author_id: &str,
        title: &str,
        content: &str,
    ) -> CoreResult<Self> {
        let input = Self {
            owner_id: owner_id.trim().to_string(),
            author_id: author_id.trim().to_string(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
        };
        input
            .validate()
            .map_err(|e| CoreError::InvalidArgument(e.to_string()))?;
        Ok(input)
    }

    /// Stamp the record with a fresh id and creation time.
    pub fn into_record(self) -> HealthRecord {
        HealthRecord {
            id: Uuid::now_v7(),
            owner_id: self.owner_id,
            title: self.title,
            content: self.content,
            author_id: self.author_id,
            created_at: Utc::now(),
            version: INITIAL_RECORD_VERSION,
        }
    }
}

/// Concatenate records as `"{title}: {content}"` blocks separated by blank lines.
pub fn summary_input(records: &[HealthRecord]) -> String {
    if records.is_empty() {
        return EMPTY_SUMMARY_INPUT.to_string();
    }
    records
        .iter()
        .map(|r| format!("{}: {}", r.title, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
