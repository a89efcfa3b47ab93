//! Session record repository

use sqlx::PgPool;
use crate::models::session::{SessionRecord, CreateSessionRecordRequest};
use crate::utils::errors::WordBuddyError;

#[derive(Clone)]
#[derive(Debug)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateSessionRecordRequest) -> Result<SessionRecord, WordBuddyError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO session_records (user_id, started_at, duration_secs, learned_words)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, started_at, duration_secs, learned_words
            "#
        )
        .bind(request.user_id)
        .bind(request.started_at)
        .bind(request.duration_secs)
        .bind(request.learned_words)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Oldest session first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<SessionRecord>, WordBuddyError> {
        let records = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, started_at, duration_secs, learned_words
            FROM session_records
            WHERE user_id = $1
            ORDER BY started_at ASC, id ASC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64, WordBuddyError> {
        let result = sqlx::query("DELETE FROM session_records WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
