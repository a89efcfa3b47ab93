//! Conversation context management
//!
//! This module tracks where each user is in the add-word and delete-word
//! dialogues.

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Duration};

use crate::utils::errors::{WordBuddyError, Result};

/// Step of the multi-turn dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    /// Waiting for a word to add
    AwaitingWord,
    /// Word saved, waiting for "add another" or "main menu"
    AwaitingChoice,
    /// Waiting for a word to delete
    AwaitingDeleteTarget,
    /// Deletion reported, waiting for "delete another" or "main menu"
    AwaitingDeleteChoice,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Idle => "idle",
            ConversationState::AwaitingWord => "awaiting_word",
            ConversationState::AwaitingChoice => "awaiting_choice",
            ConversationState::AwaitingDeleteTarget => "awaiting_delete_target",
            ConversationState::AwaitingDeleteChoice => "awaiting_delete_choice",
        }
    }

    /// Whether the dialogue may move from `self` to `next`
    pub fn can_transition_to(&self, next: ConversationState) -> bool {
        use ConversationState::*;
        matches!(
            (self, next),
            (_, Idle)
                | (Idle, AwaitingWord)
                | (Idle, AwaitingDeleteTarget)
                | (AwaitingWord, AwaitingWord)
                | (AwaitingWord, AwaitingChoice)
                | (AwaitingChoice, AwaitingWord)
                | (AwaitingDeleteTarget, AwaitingDeleteChoice)
                | (AwaitingDeleteChoice, AwaitingDeleteTarget)
        )
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User conversation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// User ID this context belongs to
    pub user_id: i64,
    pub state: ConversationState,
    /// Failed inputs at the current prompt
    pub attempts: u32,
    /// When this context expires (for cleanup)
    pub expires_at: Option<DateTime<Utc>>,
    /// When this context was last updated
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Create a new idle context for a user
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            state: ConversationState::Idle,
            attempts: 0,
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Move to `next`, resetting the attempt counter and expiry
    pub fn transition(&mut self, next: ConversationState, now: DateTime<Utc>, ttl: Duration) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(WordBuddyError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }

        self.state = next;
        self.attempts = 0;
        self.updated_at = now;
        self.expires_at = Some(now + ttl);
        Ok(())
    }

    /// Count a rejected input and refresh expiry
    pub fn record_attempt(&mut self, now: DateTime<Utc>, ttl: Duration) -> u32 {
        self.attempts += 1;
        self.updated_at = now;
        self.expires_at = Some(now + ttl);
        self.attempts
    }

    pub fn is_idle(&self) -> bool {
        self.state == ConversationState::Idle
    }

    /// Check if context has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| now > expires_at)
    }
}
