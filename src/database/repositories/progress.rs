//! Learning progress repository

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::word::WordRef;
use crate::utils::errors::WordBuddyError;

#[derive(Clone)]
#[derive(Debug)]
pub struct ProgressRepository {
    pool: PgPool,
}

impl ProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns true when a new row was written
    pub async fn insert_if_absent(&self, user_id: i64, word: WordRef, learned_at: DateTime<Utc>) -> Result<bool, WordBuddyError> {
        let result = sqlx::query(
            r#"
            INSERT INTO progress (user_id, word_id, word_kind, learned_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, word_id, word_kind) DO NOTHING
            "#
        )
        .bind(user_id)
        .bind(word.id)
        .bind(word.kind.as_str())
        .bind(learned_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_between(&self, user_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, WordBuddyError> {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM progress WHERE user_id = $1 AND learned_at BETWEEN $2 AND $3"
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count(&self, user_id: i64) -> Result<i64, WordBuddyError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64, WordBuddyError> {
        let result = sqlx::query("DELETE FROM progress WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
