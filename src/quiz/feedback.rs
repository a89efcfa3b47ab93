//! Feedback phrase rotation
//!
//! Phrases cycle round-robin independently for each user and each kind.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
}

#[derive(Debug, Default)]
pub struct FeedbackRotator {
    positions: Mutex<HashMap<(i64, FeedbackKind), usize>>,
}

impl FeedbackRotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn correct_feedback(&self, user_id: i64, phrases: &[String]) -> Option<String> {
        self.next(user_id, FeedbackKind::Correct, phrases)
    }

    pub fn incorrect_feedback(&self, user_id: i64, phrases: &[String]) -> Option<String> {
        self.next(user_id, FeedbackKind::Incorrect, phrases)
    }

    /// Next phrase of the cycle, `None` for an empty list
    pub fn next(&self, user_id: i64, kind: FeedbackKind, phrases: &[String]) -> Option<String> {
        if phrases.is_empty() {
            return None;
        }
        let mut positions = self.positions.lock().unwrap_or_else(|e| e.into_inner());
        let position = positions.entry((user_id, kind)).or_insert(0);
        let phrase = phrases[*position % phrases.len()].clone();
        *position = (*position + 1) % phrases.len();
        Some(phrase)
    }

    /// Drop the rotation state of a user
    pub fn forget(&self, user_id: i64) {
        self.positions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(id, _), _| *id != user_id);
    }
}
