//! Optional demo accounts for local development.
//!
//! Creates one doctor and one migrant so the consent handshake can be driven
//! end to end without an admin surface. Seeding is idempotent: existing rows
//! are left untouched.

use arogya_core::identity::UserAccount;
use arogya_core::memory::{MemoryOwnerDirectory, MemoryUserDirectory};
use arogya_core::owner::{Owner, DEFAULT_LANGUAGE};
use arogya_core::ports::{OwnerDirectory, UserDirectory};
use arogya_core::roles::ROLE_DOCTOR;
use arogya_db::models::owner::CreateOwner;
use arogya_db::models::user::CreateUser;
use arogya_db::repositories::{OwnerRepo, UserRepo};
use arogya_db::DbPool;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Demo identities, loaded from the environment.
#[derive(Debug, Clone)]
pub struct DemoSeed {
    pub doctor_email: String,
    pub doctor_password: String,
    pub migrant_id: String,
    pub migrant_phone: String,
}

impl DemoSeed {
    /// Returns `None` unless `SEED_DEMO_DATA` is `true` or `1`.
    ///
    /// | Env Var                | Default               |
    /// |------------------------|-----------------------|
    /// | `SEED_DEMO_DATA`       | off                   |
    /// | `SEED_DOCTOR_EMAIL`    | `doctor@arogya.local` |
    /// | `SEED_DOCTOR_PASSWORD` | `arogya-demo`         |
    /// | `SEED_MIGRANT_ID`      | `MIG-DEMO`            |
    /// | `SEED_MIGRANT_PHONE`   | `+910000000000`       |
    pub fn from_env() -> Option<Self> {
        let enabled = std::env::var("SEED_DEMO_DATA")
            .map(|v| matches!(v.as_str(), "true" | "1"))
            .unwrap_or(false);
        if !enabled {
            return None;
        }
        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };
        Some(Self {
            doctor_email: var("SEED_DOCTOR_EMAIL", "doctor@arogya.local"),
            doctor_password: var("SEED_DOCTOR_PASSWORD", "arogya-demo"),
            migrant_id: var("SEED_MIGRANT_ID", "MIG-DEMO"),
            migrant_phone: var("SEED_MIGRANT_PHONE", "+910000000000"),
        })
    }

    fn password_hash(&self) -> AppResult<String> {
        hash_password(&self.doctor_password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
    }

    /// Seed the in-memory directories.
    pub async fn apply_memory(
        &self,
        owners: &MemoryOwnerDirectory,
        users: &MemoryUserDirectory,
    ) -> AppResult<()> {
        if users.find_by_email(&self.doctor_email).await?.is_none() {
            users
                .upsert(UserAccount {
                    id: Uuid::new_v4().to_string(),
                    name: "Demo Doctor".into(),
                    email: self.doctor_email.clone(),
                    phone: None,
                    role: ROLE_DOCTOR.into(),
                    password_hash: self.password_hash()?,
                })
                .await;
        }
        if owners.find_owner(&self.migrant_id).await?.is_none() {
            owners
                .upsert(Owner {
                    unique_id: self.migrant_id.clone(),
                    name: "Demo Migrant".into(),
                    phone: self.migrant_phone.clone(),
                    dob: None,
                    gender: None,
                    language: DEFAULT_LANGUAGE.into(),
                    is_verified: true,
                    password_hash: None,
                    created_at: Utc::now(),
                })
                .await;
        }
        tracing::info!(doctor = %self.doctor_email, migrant = %self.migrant_id, "Demo data seeded");
        Ok(())
    }

    /// Seed the Postgres tables.
    pub async fn apply_postgres(&self, pool: &DbPool) -> AppResult<()> {
        if UserRepo::find_by_email(pool, &self.doctor_email).await?.is_none() {
            UserRepo::create(
                pool,
                &CreateUser {
                    name: "Demo Doctor".into(),
                    email: self.doctor_email.clone(),
                    phone: None,
                    role: ROLE_DOCTOR.into(),
                    password_hash: self.password_hash()?,
                },
            )
            .await?;
        }
        if OwnerRepo::find_by_unique_id(pool, &self.migrant_id).await?.is_none() {
            OwnerRepo::create(
                pool,
                &CreateOwner {
                    unique_id: self.migrant_id.clone(),
                    name: "Demo Migrant".into(),
                    phone: self.migrant_phone.clone(),
                    dob: None,
                    gender: None,
                    language: None,
                    is_verified: true,
                    password_hash: None,
                },
            )
            .await?;
        }
        tracing::info!(doctor = %self.doctor_email, migrant = %self.migrant_id, "Demo data seeded");
        Ok(())
    }
}
