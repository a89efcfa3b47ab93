//! In-memory word pool
//!
//! A [`WordPoolStore`] kept entirely in process memory. Used by the test
//! suites and for running the bot locally without PostgreSQL.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use tracing::debug;

use super::store::WordPoolStore;
use crate::models::{
    CreateSessionRecordRequest, CreateUserRequest, ProgressRecord, SessionRecord, User, Word, WordKind, WordRef,
};
use crate::utils::errors::{Result, WordBuddyError};
use crate::utils::helpers::{normalize_term, same_term};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, User>,
    shared: Vec<Word>,
    personal: Vec<Word>,
    progress: Vec<ProgressRecord>,
    sessions: Vec<SessionRecord>,
    next_shared_id: i64,
    next_personal_id: i64,
    next_session_id: i64,
}

/// Word pool held in memory
#[derive(Debug, Default)]
pub struct MemoryWordPool {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryWordPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool with the given `(target, source)` pairs in the shared dictionary
    pub fn with_shared_words(pairs: &[(&str, &str)]) -> Self {
        let pool = Self::new();
        for (target, source) in pairs {
            pool.add_shared_word(target, source);
        }
        pool
    }

    /// Add a word to the shared dictionary and return its id
    pub fn add_shared_word(&self, target_term: &str, source_term: &str) -> i64 {
        let mut tables = self.lock();
        tables.next_shared_id += 1;
        let id = tables.next_shared_id;
        tables.shared.push(Word {
            id,
            kind: WordKind::Shared,
            source_term: normalize_term(source_term),
            target_term: normalize_term(target_term),
            owner: None,
        });
        id
    }

    /// Make every following call fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// All progress records of a user
    pub fn progress_of(&self, user_id: i64) -> Vec<ProgressRecord> {
        self.lock()
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(WordBuddyError::ServiceUnavailable("word pool is unavailable".to_string()));
        }
        Ok(())
    }
}

impl Tables {
    fn personal_of(&self, user_id: i64) -> impl Iterator<Item = &Word> {
        self.personal.iter().filter(move |w| w.owner == Some(user_id))
    }

    fn seen(&self, user_id: i64) -> HashSet<WordRef> {
        self.progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.word)
            .collect()
    }
}

#[async_trait]
impl WordPoolStore for MemoryWordPool {
    async fn ensure_user(&self, request: CreateUserRequest) -> Result<User> {
        self.check_available()?;
        let mut tables = self.lock();
        let user = tables.users.entry(request.id).or_insert_with(|| User {
            id: request.id,
            username: request.username,
            first_name: request.first_name,
            created_at: Utc::now(),
        });
        Ok(user.clone())
    }

    async fn get_unseen_word(&self, user_id: i64) -> Result<Option<Word>> {
        self.check_available()?;
        let tables = self.lock();
        let seen = tables.seen(user_id);
        let candidates: Vec<&Word> = tables
            .shared
            .iter()
            .chain(tables.personal_of(user_id))
            .filter(|w| !seen.contains(&w.word_ref()))
            .collect();

        let picked = candidates.choose(&mut rand::thread_rng()).map(|w| (*w).clone());
        debug!(user_id = user_id, candidates = candidates.len(), "Picked unseen word");
        Ok(picked)
    }

    async fn shared_translations_except(&self, exclude: &str, limit: usize) -> Result<Vec<String>> {
        self.check_available()?;
        let tables = self.lock();
        let mut distinct: Vec<String> = Vec::new();
        for word in &tables.shared {
            let term = normalize_term(&word.source_term);
            if !same_term(&term, exclude) && !distinct.contains(&term) {
                distinct.push(term);
            }
        }
        distinct.shuffle(&mut rand::thread_rng());
        distinct.truncate(limit);
        Ok(distinct)
    }

    async fn insert_progress_if_absent(&self, user_id: i64, word: WordRef, learned_at: DateTime<Utc>) -> Result<bool> {
        self.check_available()?;
        let mut tables = self.lock();
        if tables.progress.iter().any(|p| p.user_id == user_id && p.word == word) {
            return Ok(false);
        }
        tables.progress.push(ProgressRecord { user_id, word, learned_at });
        Ok(true)
    }

    async fn count_progress_in_range(&self, user_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        self.check_available()?;
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        let count = self
            .lock()
            .progress
            .iter()
            .filter(|p| p.user_id == user_id && p.learned_at >= start && p.learned_at <= end)
            .count();
        Ok(count as i64)
    }

    async fn count_progress(&self, user_id: i64) -> Result<i64> {
        self.check_available()?;
        Ok(self.lock().progress.iter().filter(|p| p.user_id == user_id).count() as i64)
    }

    async fn reset_progress(&self, user_id: i64) -> Result<u64> {
        self.check_available()?;
        let mut tables = self.lock();
        let before = tables.progress.len();
        tables.progress.retain(|p| p.user_id != user_id);
        Ok((before - tables.progress.len()) as u64)
    }

    async fn insert_personal_word(&self, user_id: i64, target_term: &str, source_term: &str) -> Result<bool> {
        self.check_available()?;
        let target_term = normalize_term(target_term);
        let source_term = normalize_term(source_term);
        let mut tables = self.lock();
        let exists = tables
            .personal_of(user_id)
            .any(|w| same_term(&w.target_term, &target_term) || same_term(&w.source_term, &source_term));
        if exists {
            return Ok(false);
        }
        tables.next_personal_id += 1;
        let id = tables.next_personal_id;
        tables.personal.push(Word {
            id,
            kind: WordKind::Personal,
            source_term,
            target_term,
            owner: Some(user_id),
        });
        Ok(true)
    }

    async fn delete_personal_word(&self, user_id: i64, term: &str) -> Result<bool> {
        self.check_available()?;
        let mut tables = self.lock();
        let position = tables
            .personal
            .iter()
            .position(|w| w.owner == Some(user_id) && (same_term(&w.source_term, term) || same_term(&w.target_term, term)));

        match position {
            Some(index) => {
                let removed = tables.personal.remove(index);
                let removed_ref = removed.word_ref();
                tables.progress.retain(|p| p.word != removed_ref);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_personal_words(&self, user_id: i64) -> Result<i64> {
        self.check_available()?;
        Ok(self.lock().personal_of(user_id).count() as i64)
    }

    async fn list_personal_words(&self, user_id: i64) -> Result<Vec<Word>> {
        self.check_available()?;
        Ok(self.lock().personal_of(user_id).cloned().collect())
    }

    async fn check_duplicate(&self, user_id: i64, term: &str) -> Result<bool> {
        self.check_available()?;
        let tables = self.lock();
        let found = tables
            .shared
            .iter()
            .chain(tables.personal_of(user_id))
            .any(|w| same_term(&w.source_term, term) || same_term(&w.target_term, term));
        Ok(found)
    }

    async fn append_session_record(&self, request: CreateSessionRecordRequest) -> Result<SessionRecord> {
        self.check_available()?;
        let mut tables = self.lock();
        tables.next_session_id += 1;
        let record = SessionRecord {
            id: tables.next_session_id,
            user_id: request.user_id,
            started_at: request.started_at,
            duration_secs: request.duration_secs,
            learned_words: request.learned_words,
        };
        tables.sessions.push(record.clone());
        Ok(record)
    }

    async fn list_session_records(&self, user_id: i64) -> Result<Vec<SessionRecord>> {
        self.check_available()?;
        let mut records: Vec<SessionRecord> = self
            .lock()
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|s| (s.started_at, s.id));
        Ok(records)
    }

    async fn delete_session_records(&self, user_id: i64) -> Result<u64> {
        self.check_available()?;
        let mut tables = self.lock();
        let before = tables.sessions.len();
        tables.sessions.retain(|s| s.user_id != user_id);
        Ok((before - tables.sessions.len()) as u64)
    }
}
