//! Add-word and delete-word dialogues
//!
//! ```text
//! Idle --BeginAdd--> AwaitingWord --word saved--> AwaitingChoice --AddAnother--> AwaitingWord
//! Idle --BeginDelete--> AwaitingDeleteTarget --Input--> AwaitingDeleteChoice --DeleteAnother--> AwaitingDeleteTarget
//! any --ReturnToMain--> Idle
//! ```

use std::sync::Arc;

use chrono::Duration;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::FlowConfig;
use crate::database::WordPoolStore;
use crate::services::translation::TranslationClient;
use crate::state::context::{ConversationContext, ConversationState};
use crate::state::session::{EndReason, SessionController, SessionSummary};
use crate::state::storage::ConversationStore;
use crate::utils::clock::Clock;
use crate::utils::errors::{ErrorKind, Result, TranslationError, WordBuddyError};
use crate::utils::helpers::normalize_term;
use crate::utils::logging::log_transition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    BeginAdd,
    BeginDelete,
    Input(String),
    AddAnother,
    DeleteAnother,
    ReturnToMain,
}

/// Why a word offered for adding was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotSingleWord,
    WrongAlphabet,
    Duplicate { term: String },
    TranslationNotFound { term: String },
}

impl Rejection {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Rejection::NotSingleWord | Rejection::WrongAlphabet => ErrorKind::Validation,
            Rejection::Duplicate { .. } => ErrorKind::Duplicate,
            Rejection::TranslationNotFound { .. } => ErrorKind::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Waiting for a word to add
    PromptWord,
    WordAdded { source_term: String, target_term: String, total: i64 },
    /// Input refused, still waiting for a word
    Rejected(Rejection),
    /// Retry limit reached, dialogue closed
    TooManyAttempts(Rejection),
    /// Waiting for a word to delete
    PromptDeleteTarget,
    Deleted { term: String },
    DeleteMissed { term: String },
    /// Text arrived while a choice button was expected
    ChoicePending(ConversationState),
    ReturnedToMain { session: Option<SessionSummary> },
    /// Text outside of any dialogue
    NotInDialogue,
}

pub struct ConversationFlow {
    store: Arc<dyn WordPoolStore>,
    translator: Arc<dyn TranslationClient>,
    contexts: Arc<dyn ConversationStore>,
    sessions: SessionController,
    clock: Arc<dyn Clock>,
    source_pattern: Regex,
    direction: String,
    max_attempts: u32,
    ttl: Duration,
}

impl ConversationFlow {
    pub fn new(
        store: Arc<dyn WordPoolStore>,
        translator: Arc<dyn TranslationClient>,
        contexts: Arc<dyn ConversationStore>,
        sessions: SessionController,
        clock: Arc<dyn Clock>,
        config: &FlowConfig,
        direction: &str,
    ) -> Result<Self> {
        let source_pattern = Regex::new(&config.source_word_pattern)
            .map_err(|e| WordBuddyError::Config(format!("Invalid source word pattern: {}", e)))?;

        Ok(Self {
            store,
            translator,
            contexts,
            sessions,
            clock,
            source_pattern,
            direction: direction.to_string(),
            max_attempts: config.max_attempts,
            ttl: Duration::seconds(config.ttl_seconds as i64),
        })
    }

    /// Current dialogue step, `Idle` when nothing is stored or the context expired
    pub async fn current_state(&self, user_id: i64) -> Result<ConversationState> {
        Ok(self.load(user_id).await?.state)
    }

    /// Drop any dialogue without touching the quiz session
    pub async fn clear(&self, user_id: i64) -> Result<()> {
        self.contexts.delete_context(user_id).await
    }

    pub async fn handle(&self, user_id: i64, event: FlowEvent) -> Result<FlowOutcome> {
        let context = self.load(user_id).await?;

        match (context.state, event) {
            (_, FlowEvent::ReturnToMain) => self.return_to_main(user_id, context.state).await,
            (_, FlowEvent::BeginAdd) => self.begin(user_id, ConversationState::AwaitingWord).await,
            (_, FlowEvent::BeginDelete) => self.begin(user_id, ConversationState::AwaitingDeleteTarget).await,
            (ConversationState::AwaitingChoice, FlowEvent::AddAnother) => {
                self.advance(context, ConversationState::AwaitingWord).await?;
                Ok(FlowOutcome::PromptWord)
            }
            (_, FlowEvent::AddAnother) => self.begin(user_id, ConversationState::AwaitingWord).await,
            (ConversationState::AwaitingDeleteChoice, FlowEvent::DeleteAnother) => {
                self.advance(context, ConversationState::AwaitingDeleteTarget).await?;
                Ok(FlowOutcome::PromptDeleteTarget)
            }
            (_, FlowEvent::DeleteAnother) => self.begin(user_id, ConversationState::AwaitingDeleteTarget).await,
            (ConversationState::AwaitingWord, FlowEvent::Input(text)) => self.add_word(context, &text).await,
            (ConversationState::AwaitingDeleteTarget, FlowEvent::Input(text)) => self.delete_word(context, &text).await,
            (state @ (ConversationState::AwaitingChoice | ConversationState::AwaitingDeleteChoice), FlowEvent::Input(_)) => {
                Ok(FlowOutcome::ChoicePending(state))
            }
            (ConversationState::Idle, FlowEvent::Input(_)) => Ok(FlowOutcome::NotInDialogue),
        }
    }

    async fn load(&self, user_id: i64) -> Result<ConversationContext> {
        let now = self.clock.now();
        Ok(self
            .contexts
            .load_context(user_id)
            .await?
            .filter(|c| !c.is_expired_at(now))
            .unwrap_or_else(|| ConversationContext::new(user_id)))
    }

    async fn begin(&self, user_id: i64, state: ConversationState) -> Result<FlowOutcome> {
        self.advance(ConversationContext::new(user_id), state).await?;
        Ok(match state {
            ConversationState::AwaitingDeleteTarget => FlowOutcome::PromptDeleteTarget,
            _ => FlowOutcome::PromptWord,
        })
    }

    async fn advance(&self, mut context: ConversationContext, next: ConversationState) -> Result<()> {
        let from = context.state;
        context.transition(next, self.clock.now(), self.ttl)?;
        self.contexts.save_context(&context).await?;
        log_transition(context.user_id, from.as_str(), next.as_str());
        Ok(())
    }

    async fn return_to_main(&self, user_id: i64, from: ConversationState) -> Result<FlowOutcome> {
        let session = self.sessions.end_session(user_id, EndReason::Manual).await?;
        self.contexts.delete_context(user_id).await?;
        log_transition(user_id, from.as_str(), ConversationState::Idle.as_str());
        Ok(FlowOutcome::ReturnedToMain { session })
    }

    async fn add_word(&self, context: ConversationContext, text: &str) -> Result<FlowOutcome> {
        let user_id = context.user_id;
        match self.validate_and_insert(user_id, text).await? {
            Ok((source_term, target_term, total)) => {
                // The word is stored; a failed step change must not report it as lost
                if let Err(e) = self.advance(context, ConversationState::AwaitingChoice).await {
                    warn!(user_id = user_id, error = %e, "Word added but dialogue step not saved");
                }
                Ok(FlowOutcome::WordAdded { source_term, target_term, total })
            }
            Err(rejection) => self.reject(context, rejection).await,
        }
    }

    /// Runs the checks in order, stopping at the first refusal.
    /// The outer error is a collaborator failure, the inner one a refusal.
    /// On success yields the stored pair and the new personal-word count.
    async fn validate_and_insert(
        &self,
        user_id: i64,
        text: &str,
    ) -> Result<std::result::Result<(String, String, i64), Rejection>> {
        let mut tokens = text.split_whitespace();
        let token = match (tokens.next(), tokens.next()) {
            (Some(token), None) => normalize_term(token),
            _ => return Ok(Err(Rejection::NotSingleWord)),
        };

        if !self.source_pattern.is_match(&token) {
            return Ok(Err(Rejection::WrongAlphabet));
        }

        if self.store.check_duplicate(user_id, &token).await? {
            return Ok(Err(Rejection::Duplicate { term: token }));
        }

        let candidates = match self.translator.lookup(&token, &self.direction).await {
            Ok(candidates) => candidates,
            Err(TranslationError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let Some(translation) = candidates.first().map(|c| normalize_term(c)).filter(|c| !c.is_empty()) else {
            return Ok(Err(Rejection::TranslationNotFound { term: token }));
        };

        if self.store.check_duplicate(user_id, &translation).await? {
            return Ok(Err(Rejection::Duplicate { term: translation }));
        }

        // Counted before the insert so that nothing after it can fail
        let existing = self.store.count_personal_words(user_id).await?;
        if !self.store.insert_personal_word(user_id, &translation, &token).await? {
            return Ok(Err(Rejection::Duplicate { term: token }));
        }

        debug!(user_id = user_id, source = %token, target = %translation, "Personal word added");
        Ok(Ok((token, translation, existing + 1)))
    }

    async fn reject(&self, mut context: ConversationContext, rejection: Rejection) -> Result<FlowOutcome> {
        let attempts = context.record_attempt(self.clock.now(), self.ttl);

        if self.max_attempts > 0 && attempts >= self.max_attempts {
            let user_id = context.user_id;
            self.contexts.delete_context(user_id).await?;
            log_transition(user_id, context.state.as_str(), ConversationState::Idle.as_str());
            return Ok(FlowOutcome::TooManyAttempts(rejection));
        }

        self.contexts.save_context(&context).await?;
        Ok(FlowOutcome::Rejected(rejection))
    }

    async fn delete_word(&self, context: ConversationContext, text: &str) -> Result<FlowOutcome> {
        let term = normalize_term(text);
        let deleted = self.store.delete_personal_word(context.user_id, &term).await?;
        self.advance(context, ConversationState::AwaitingDeleteChoice).await?;

        Ok(if deleted {
            FlowOutcome::Deleted { term }
        } else {
            FlowOutcome::DeleteMissed { term }
        })
    }
}
