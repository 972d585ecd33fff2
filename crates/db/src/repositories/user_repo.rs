//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::{CreateUser, UserRow};

const COLUMNS: &str = "id, name, email, phone, role, password_hash, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, phone, role, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.role)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Case-insensitive lookup, matching the `uq_users_email` index.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
