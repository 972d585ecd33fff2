//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20261001000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_DOCTOR: &str = "doctor";
pub const ROLE_WORKER: &str = "worker";
pub const ROLE_EMPLOYER: &str = "employer";

/// Roles allowed to open an access request against an owner's records.
pub const CLINICIAN_ROLES: &[&str] = &[ROLE_DOCTOR, ROLE_ADMIN];

/// Returns `true` if `role` may request access to another person's records.
pub fn is_clinician(role: &str) -> bool {
    CLINICIAN_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctors_and_admins_are_clinicians() {
        assert!(is_clinician(ROLE_DOCTOR));
        assert!(is_clinician(ROLE_ADMIN));
    }

    #[test]
    fn other_roles_are_not_clinicians() {
        assert!(!is_clinician(ROLE_WORKER));
        assert!(!is_clinician(ROLE_EMPLOYER));
        assert!(!is_clinician("migrant"));
        assert!(!is_clinician(""));
    }
}
