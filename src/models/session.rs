//! Quiz session records

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One completed quiz session. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub started_at: DateTime<Utc>,
    /// Whole seconds
    pub duration_secs: i64,
    pub learned_words: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRecordRequest {
    pub user_id: i64,
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub learned_words: i64,
}
