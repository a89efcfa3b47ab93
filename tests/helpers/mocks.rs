//! Mock collaborators

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use WordBuddy::services::speech::SpeechSynthesizer;
use WordBuddy::services::translation::TranslationClient;
use WordBuddy::state::context::ConversationContext;
use WordBuddy::state::session::{ExpiryNotifier, SessionSummary};
use WordBuddy::state::storage::{ConversationStore, MemoryStateStorage};
use WordBuddy::utils::errors::{Result, SpeechResult, TranslationError, TranslationResult, WordBuddyError};

/// Dictionary backed by a fixed map of `term -> candidates`
#[derive(Default)]
pub struct MockTranslator {
    entries: Mutex<HashMap<String, Vec<String>>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockTranslator {
    /// One candidate per term
    pub fn new(entries: &[(&str, &str)]) -> Self {
        let translator = Self::default();
        for (term, candidate) in entries {
            translator.insert(term, &[*candidate]);
        }
        translator
    }

    pub fn insert(&self, term: &str, candidates: &[&str]) {
        self.entries
            .lock()
            .unwrap()
            .insert(term.to_string(), candidates.iter().map(|c| c.to_string()).collect());
    }

    /// Make every lookup fail as if the API timed out
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationClient for MockTranslator {
    async fn lookup(&self, term: &str, _direction: &str) -> TranslationResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(TranslationError::Timeout);
        }
        match self.entries.lock().unwrap().get(term) {
            Some(candidates) if !candidates.is_empty() => Ok(candidates.clone()),
            _ => Err(TranslationError::NotFound(term.to_string())),
        }
    }
}

/// Records every expiry notice
#[derive(Default)]
pub struct RecordingNotifier {
    pub expired: Mutex<Vec<SessionSummary>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<SessionSummary> {
        self.expired.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExpiryNotifier for RecordingNotifier {
    async fn session_expired(&self, summary: &SessionSummary) {
        self.expired.lock().unwrap().push(summary.clone());
    }
}

/// Returns the text bytes as audio
#[derive(Default)]
pub struct EchoSpeech {
    pub requests: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for EchoSpeech {
    async fn synthesize(&self, text: &str) -> SpeechResult<Vec<u8>> {
        self.requests.lock().unwrap().push(text.to_string());
        Ok(text.as_bytes().to_vec())
    }
}

/// In-memory context store whose saves can be switched to fail
#[derive(Default)]
pub struct FlakyContexts {
    inner: MemoryStateStorage,
    failing_saves: AtomicBool,
}

impl FlakyContexts {
    pub fn set_failing_saves(&self, failing: bool) {
        self.failing_saves.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConversationStore for FlakyContexts {
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        self.inner.load_context(user_id).await
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        if self.failing_saves.load(Ordering::SeqCst) {
            return Err(WordBuddyError::ServiceUnavailable("context store".to_string()));
        }
        self.inner.save_context(context).await
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        self.inner.delete_context(user_id).await
    }
}
