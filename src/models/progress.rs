//! Learning progress model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use super::word::WordRef;

/// Fact that a user answered a word correctly at least once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: i64,
    pub word: WordRef,
    /// Start of the session in which the word was learned
    pub learned_at: DateTime<Utc>,
}
