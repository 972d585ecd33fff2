//! Authenticated caller identity and login accounts.
//!
//! The core never decodes tokens itself. The transport layer resolves a
//! bearer token into a [`Caller`] once and passes it into each operation.

use crate::error::{CoreError, CoreResult};
use crate::roles::{self, ROLE_ADMIN};

/// A validated, authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub role: String,
}

impl Caller {
    /// Build a caller, rejecting a blank id or role.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> CoreResult<Self> {
        let id = id.into();
        let role = role.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "Caller identity must not be empty".into(),
            ));
        }
        if role.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "Caller role must not be empty".into(),
            ));
        }
        Ok(Self { id, role })
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_clinician(&self) -> bool {
        roles::is_clinician(&self.role)
    }
}

/// A staff account that can log in and receive an identity token.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_DOCTOR, ROLE_WORKER};

    #[test]
    fn blank_identity_is_rejected() {
        assert!(Caller::new("", ROLE_DOCTOR).is_err());
        assert!(Caller::new("   ", ROLE_DOCTOR).is_err());
        assert!(Caller::new("doc-1", "").is_err());
    }

    #[test]
    fn role_helpers() {
        let doctor = Caller::new("doc-1", ROLE_DOCTOR).unwrap();
        assert!(doctor.is_clinician());
        assert!(!doctor.is_admin());

        let worker = Caller::new("w-1", ROLE_WORKER).unwrap();
        assert!(!worker.is_clinician());
    }
}
