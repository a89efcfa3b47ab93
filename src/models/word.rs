//! Dictionary word models

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Which dictionary a word belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordKind {
    /// Global dictionary, read-only to users
    Shared,
    /// Owned by one user
    Personal,
}

impl WordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordKind::Shared => "shared",
            WordKind::Personal => "personal",
        }
    }
}

impl fmt::Display for WordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(WordKind::Shared),
            "personal" => Ok(WordKind::Personal),
            other => Err(format!("Unknown word kind: {}", other)),
        }
    }
}

/// Reference to a word in either dictionary.
///
/// A shared and a personal word with the same id are different words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordRef {
    pub id: i64,
    pub kind: WordKind,
}

impl WordRef {
    pub fn shared(id: i64) -> Self {
        Self { id, kind: WordKind::Shared }
    }

    pub fn personal(id: i64) -> Self {
        Self { id, kind: WordKind::Personal }
    }
}

/// A word pair from the learner's effective pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub kind: WordKind,
    /// Term in the learner's language
    pub source_term: String,
    /// Term in the language being learned
    pub target_term: String,
    /// Owner of a personal word
    pub owner: Option<i64>,
}

impl Word {
    pub fn word_ref(&self) -> WordRef {
        WordRef { id: self.id, kind: self.kind }
    }
}

/// Row of the shared dictionary
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SharedWord {
    pub id: i64,
    pub source_term: String,
    pub target_term: String,
}

impl From<SharedWord> for Word {
    fn from(row: SharedWord) -> Self {
        Self {
            id: row.id,
            kind: WordKind::Shared,
            source_term: row.source_term,
            target_term: row.target_term,
            owner: None,
        }
    }
}

/// Row of a user's personal dictionary
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PersonalWord {
    pub id: i64,
    pub user_id: i64,
    pub source_term: String,
    pub target_term: String,
    pub created_at: DateTime<Utc>,
}

impl From<PersonalWord> for Word {
    fn from(row: PersonalWord) -> Self {
        Self {
            id: row.id,
            kind: WordKind::Personal,
            source_term: row.source_term,
            target_term: row.target_term,
            owner: Some(row.user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_kind_round_trips_through_text() {
        assert_eq!("shared".parse::<WordKind>(), Ok(WordKind::Shared));
        assert_eq!(WordKind::Personal.to_string(), "personal");
        assert!("common".parse::<WordKind>().is_err());
    }

    #[test]
    fn test_refs_with_same_id_differ_by_kind() {
        assert_ne!(WordRef::shared(1), WordRef::personal(1));
    }
}
