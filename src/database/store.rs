//! Word pool store abstraction
//!
//! Everything the quiz, dialogue and statistics components need from
//! persistent storage. [`crate::database::DatabaseService`] implements it on
//! PostgreSQL and [`crate::database::MemoryWordPool`] in process memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{CreateSessionRecordRequest, CreateUserRequest, SessionRecord, User, Word, WordRef};
use crate::utils::errors::Result;

#[async_trait]
pub trait WordPoolStore: Send + Sync {
    /// Create the user on first contact, return the stored row otherwise
    async fn ensure_user(&self, request: CreateUserRequest) -> Result<User>;

    /// Random word from shared ∪ personal(user) that has no progress record yet
    async fn get_unseen_word(&self, user_id: i64) -> Result<Option<Word>>;

    /// Up to `limit` distinct shared source terms not equal to `exclude`, case-insensitively
    async fn shared_translations_except(&self, exclude: &str, limit: usize) -> Result<Vec<String>>;

    /// Record a correct answer. Returns false when the record already existed.
    async fn insert_progress_if_absent(&self, user_id: i64, word: WordRef, learned_at: DateTime<Utc>) -> Result<bool>;

    /// Progress records stamped within `[start, end]`
    async fn count_progress_in_range(&self, user_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64>;

    async fn count_progress(&self, user_id: i64) -> Result<i64>;

    /// Delete every progress record of the user
    async fn reset_progress(&self, user_id: i64) -> Result<u64>;

    /// Returns false when either term already exists for the user
    async fn insert_personal_word(&self, user_id: i64, target_term: &str, source_term: &str) -> Result<bool>;

    /// Delete the first personal word whose source or target matches `term`
    async fn delete_personal_word(&self, user_id: i64, term: &str) -> Result<bool>;

    async fn count_personal_words(&self, user_id: i64) -> Result<i64>;

    async fn list_personal_words(&self, user_id: i64) -> Result<Vec<Word>>;

    /// Whether `term` is present on either side of the shared or personal dictionary
    async fn check_duplicate(&self, user_id: i64, term: &str) -> Result<bool>;

    async fn append_session_record(&self, request: CreateSessionRecordRequest) -> Result<SessionRecord>;

    /// Session records ordered by start time, oldest first
    async fn list_session_records(&self, user_id: i64) -> Result<Vec<SessionRecord>>;

    async fn delete_session_records(&self, user_id: i64) -> Result<u64>;
}
