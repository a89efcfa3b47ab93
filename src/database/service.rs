//! Database service layer
//!
//! This module provides a high-level interface to database operations and
//! implements [`WordPoolStore`] on top of the repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::database::{DatabasePool, UserRepository, WordRepository, ProgressRepository, SessionRepository};
use crate::database::store::WordPoolStore;
use crate::models::*;
use crate::utils::errors::WordBuddyError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub words: WordRepository,
    pub progress: ProgressRepository,
    pub sessions: SessionRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            words: WordRepository::new(pool.clone()),
            progress: ProgressRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
        }
    }
}

#[async_trait]
impl WordPoolStore for DatabaseService {
    async fn ensure_user(&self, request: CreateUserRequest) -> Result<User, WordBuddyError> {
        self.users.upsert(request).await
    }

    async fn get_unseen_word(&self, user_id: i64) -> Result<Option<Word>, WordBuddyError> {
        let word = self.words.random_unseen(user_id).await?;
        debug!(user_id = user_id, found = word.is_some(), "Selected unseen word");
        Ok(word)
    }

    async fn shared_translations_except(&self, exclude: &str, limit: usize) -> Result<Vec<String>, WordBuddyError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.words.shared_sources_except(exclude, limit).await
    }

    async fn insert_progress_if_absent(&self, user_id: i64, word: WordRef, learned_at: DateTime<Utc>) -> Result<bool, WordBuddyError> {
        self.progress.insert_if_absent(user_id, word, learned_at).await
    }

    async fn count_progress_in_range(&self, user_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, WordBuddyError> {
        self.progress.count_between(user_id, start, end).await
    }

    async fn count_progress(&self, user_id: i64) -> Result<i64, WordBuddyError> {
        self.progress.count(user_id).await
    }

    async fn reset_progress(&self, user_id: i64) -> Result<u64, WordBuddyError> {
        let removed = self.progress.delete_for_user(user_id).await?;
        info!(user_id = user_id, removed = removed, "Progress reset");
        Ok(removed)
    }

    async fn insert_personal_word(&self, user_id: i64, target_term: &str, source_term: &str) -> Result<bool, WordBuddyError> {
        self.words.insert_personal(user_id, target_term, source_term).await
    }

    async fn delete_personal_word(&self, user_id: i64, term: &str) -> Result<bool, WordBuddyError> {
        self.words.delete_personal(user_id, term).await
    }

    async fn count_personal_words(&self, user_id: i64) -> Result<i64, WordBuddyError> {
        self.words.count_personal(user_id).await
    }

    async fn list_personal_words(&self, user_id: i64) -> Result<Vec<Word>, WordBuddyError> {
        let words = self.words.list_personal(user_id).await?;
        Ok(words.into_iter().map(Word::from).collect())
    }

    async fn check_duplicate(&self, user_id: i64, term: &str) -> Result<bool, WordBuddyError> {
        self.words.exists_anywhere(user_id, term).await
    }

    async fn append_session_record(&self, request: CreateSessionRecordRequest) -> Result<SessionRecord, WordBuddyError> {
        self.sessions.create(request).await
    }

    async fn list_session_records(&self, user_id: i64) -> Result<Vec<SessionRecord>, WordBuddyError> {
        self.sessions.list_for_user(user_id).await
    }

    async fn delete_session_records(&self, user_id: i64) -> Result<u64, WordBuddyError> {
        self.sessions.delete_for_user(user_id).await
    }
}
