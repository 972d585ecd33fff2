//! Record owners (migrant workers) and the redacted profile view.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::Timestamp;

/// Default preferred language for new owners (Malayalam).
pub const DEFAULT_LANGUAGE: &str = "ml";

/// Full owner entity as held by the owner directory.
///
/// Carries credential fields that must never leave the directory; callers
/// outside it only ever see an [`OwnerProfile`].
#[derive(Debug, Clone)]
pub struct Owner {
    /// Public identifier printed on the owner's QR card.
    pub unique_id: String,
    pub name: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub language: String,
    pub is_verified: bool,
    pub password_hash: Option<String>,
    pub created_at: Timestamp,
}

impl Owner {
    /// Out-of-band channel used to deliver access OTPs.
    pub fn contact_channel(&self) -> ContactChannel {
        ContactChannel::Sms(self.phone.clone())
    }
}

/// Owner fields a granted requester may read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerProfile {
    pub unique_id: String,
    pub name: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub language: String,
}

impl From<&Owner> for OwnerProfile {
    fn from(owner: &Owner) -> Self {
        Self {
            unique_id: owner.unique_id.clone(),
            name: owner.name.clone(),
            phone: owner.phone.clone(),
            dob: owner.dob,
            gender: owner.gender.clone(),
            language: owner.language.clone(),
        }
    }
}

/// Where an owner receives one-time codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactChannel {
    Sms(String),
}

impl ContactChannel {
    /// Channel address with all but the last four characters masked, for logs.
    pub fn masked(&self) -> String {
        match self {
            Self::Sms(phone) => {
                let visible = phone.chars().count().saturating_sub(4);
                let tail: String = phone.chars().skip(visible).collect();
                format!("sms:{}{tail}", "*".repeat(visible))
            }
        }
    }
}
