//! Shared and personal dictionary repository

use sqlx::PgPool;
use chrono::Utc;
use crate::models::word::{PersonalWord, Word};
use crate::utils::errors::WordBuddyError;
use crate::utils::helpers::normalize_term;

#[derive(Clone)]
#[derive(Debug)]
pub struct WordRepository {
    pool: PgPool,
}

/// Row of the unseen-word union query
#[derive(sqlx::FromRow)]
struct UnseenRow {
    id: i64,
    kind: String,
    source_term: String,
    target_term: String,
    owner: Option<i64>,
}

impl WordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pick a random word of `shared ∪ personal(user)` without a progress row
    pub async fn random_unseen(&self, user_id: i64) -> Result<Option<Word>, WordBuddyError> {
        let row = sqlx::query_as::<_, UnseenRow>(
            r#"
            SELECT id, kind, source_term, target_term, owner FROM (
                SELECT s.id, 'shared' AS kind, s.source_term, s.target_term, NULL::BIGINT AS owner
                FROM shared_words s
                WHERE NOT EXISTS (
                    SELECT 1 FROM progress p
                    WHERE p.user_id = $1 AND p.word_id = s.id AND p.word_kind = 'shared'
                )
                UNION ALL
                SELECT w.id, 'personal' AS kind, w.source_term, w.target_term, w.user_id AS owner
                FROM personal_words w
                WHERE w.user_id = $1 AND NOT EXISTS (
                    SELECT 1 FROM progress p
                    WHERE p.user_id = $1 AND p.word_id = w.id AND p.word_kind = 'personal'
                )
            ) AS pool
            ORDER BY RANDOM()
            LIMIT 1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let kind = row.kind.parse().map_err(|e: String| WordBuddyError::Database(sqlx::Error::Decode(e.into())))?;
            Ok(Word {
                id: row.id,
                kind,
                source_term: row.source_term,
                target_term: row.target_term,
                owner: row.owner,
            })
        })
        .transpose()
    }

    /// Distinct shared source terms other than `exclude`, in random order
    pub async fn shared_sources_except(&self, exclude: &str, limit: i64) -> Result<Vec<String>, WordBuddyError> {
        let terms = sqlx::query_scalar::<_, String>(
            r#"
            SELECT term FROM (
                SELECT DISTINCT LOWER(source_term) AS term
                FROM shared_words
                WHERE LOWER(source_term) <> LOWER($1)
            ) AS candidates
            ORDER BY RANDOM()
            LIMIT $2
            "#
        )
        .bind(exclude.trim())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(terms)
    }

    /// Insert a personal word. Returns false when a unique index rejected it.
    pub async fn insert_personal(&self, user_id: i64, target_term: &str, source_term: &str) -> Result<bool, WordBuddyError> {
        let result = sqlx::query(
            r#"
            INSERT INTO personal_words (user_id, source_term, target_term, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#
        )
        .bind(user_id)
        .bind(normalize_term(source_term))
        .bind(normalize_term(target_term))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete the lowest-id personal word matching `term` on either side, with its progress rows
    pub async fn delete_personal(&self, user_id: i64, term: &str) -> Result<bool, WordBuddyError> {
        let mut tx = self.pool.begin().await?;

        let deleted: Option<i64> = sqlx::query_scalar(
            r#"
            DELETE FROM personal_words
            WHERE id = (
                SELECT id FROM personal_words
                WHERE user_id = $1 AND (LOWER(source_term) = LOWER($2) OR LOWER(target_term) = LOWER($2))
                ORDER BY id
                LIMIT 1
            )
            RETURNING id
            "#
        )
        .bind(user_id)
        .bind(term.trim())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(word_id) = deleted {
            sqlx::query("DELETE FROM progress WHERE word_id = $1 AND word_kind = 'personal'")
                .bind(word_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted.is_some())
    }

    pub async fn count_personal(&self, user_id: i64) -> Result<i64, WordBuddyError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM personal_words WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Personal words in insertion order
    pub async fn list_personal(&self, user_id: i64) -> Result<Vec<PersonalWord>, WordBuddyError> {
        let words = sqlx::query_as::<_, PersonalWord>(
            "SELECT id, user_id, source_term, target_term, created_at FROM personal_words WHERE user_id = $1 ORDER BY id"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    /// Whether `term` appears on either side of the shared or the user's personal dictionary
    pub async fn exists_anywhere(&self, user_id: i64, term: &str) -> Result<bool, WordBuddyError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM shared_words
                WHERE LOWER(source_term) = LOWER($2) OR LOWER(target_term) = LOWER($2)
            ) OR EXISTS (
                SELECT 1 FROM personal_words
                WHERE user_id = $1 AND (LOWER(source_term) = LOWER($2) OR LOWER(target_term) = LOWER($2))
            )
            "#
        )
        .bind(user_id)
        .bind(term.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
