//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::WordBuddyError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user unless the Telegram id is already known, then return the stored row
    pub async fn upsert(&self, request: CreateUserRequest) -> Result<User, WordBuddyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, first_name, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id
            RETURNING id, username, first_name, created_at
            "#
        )
        .bind(request.id)
        .bind(request.username)
        .bind(request.first_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
