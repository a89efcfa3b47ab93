//! Learning statistics
//!
//! Read-side rollups over progress records, personal words and session
//! records. Durations stay in seconds; only rendering converts them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::database::WordPoolStore;
use crate::models::{SessionRecord, Word};
use crate::utils::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    /// Distinct words answered correctly, all time
    pub learned_words: i64,
    pub personal_words: i64,
    /// Oldest first
    pub sessions: Vec<SessionRecord>,
}

impl StatsSummary {
    pub fn total_duration_secs(&self) -> i64 {
        self.sessions.iter().map(|s| s.duration_secs).sum()
    }
}

/// Sessions of one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub sessions: usize,
    pub learned_words: i64,
    pub duration_secs: i64,
}

pub struct StatsAggregator {
    store: Arc<dyn WordPoolStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn WordPoolStore>) -> Self {
        Self { store }
    }

    pub async fn summarize(&self, user_id: i64) -> Result<StatsSummary> {
        let learned_words = self.store.count_progress(user_id).await?;
        let personal_words = self.store.count_personal_words(user_id).await?;
        let mut sessions = self.store.list_session_records(user_id).await?;
        sessions.sort_by_key(|s| (s.started_at, s.id));

        Ok(StatsSummary { learned_words, personal_words, sessions })
    }

    /// Remove session history; progress and words are kept
    pub async fn clear_sessions(&self, user_id: i64) -> Result<u64> {
        let removed = self.store.delete_session_records(user_id).await?;
        info!(user_id = user_id, removed = removed, "Session history cleared");
        Ok(removed)
    }

    /// Personal words in the order they were added
    pub async fn list_words(&self, user_id: i64) -> Result<Vec<Word>> {
        let mut words = self.store.list_personal_words(user_id).await?;
        words.sort_by_key(|w| w.id);
        Ok(words)
    }
}

/// Per-day rollup of a summary's sessions, ascending by date
pub fn daily_series(summary: &StatsSummary) -> Vec<DailyStat> {
    let mut days: BTreeMap<NaiveDate, DailyStat> = BTreeMap::new();
    for session in &summary.sessions {
        let date = session.started_at.date_naive();
        let day = days.entry(date).or_insert(DailyStat {
            date,
            sessions: 0,
            learned_words: 0,
            duration_secs: 0,
        });
        day.sessions += 1;
        day.learned_words += session.learned_words;
        day.duration_secs += session.duration_secs;
    }
    days.into_values().collect()
}
