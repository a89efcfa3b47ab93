//! Services module
//!
//! This module contains business logic services and the clients of the
//! external collaborators they depend on.

pub mod notification;
pub mod speech;
pub mod stats;
pub mod translation;
pub mod tutor;

// Re-export commonly used services
pub use notification::{NotificationService, NotificationStats};
pub use speech::{DisabledSpeech, SberSpeechService, SpeechSynthesizer};
pub use stats::{DailyStat, StatsAggregator, StatsSummary};
pub use translation::{TranslationClient, YandexDictionaryService};
pub use tutor::{Keyboard, Reply, TutorDeps, TutorService, UserEvent, UserRef};

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::settings::Settings;
use crate::database::WordPoolStore;
use crate::i18n::I18n;
use crate::state::session::ExpiryNotifier;
use crate::state::storage::{ConversationStore, MemoryStateStorage, StateStorage};
use crate::utils::clock::SystemClock;
use crate::utils::errors::Result;

/// Builds the external collaborators from configuration
#[derive(Clone)]
pub struct ServiceFactory {
    pub translator: Arc<dyn TranslationClient>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub contexts: Arc<dyn ConversationStore>,
    redis: Option<StateStorage>,
    speech_enabled: bool,
}

impl ServiceFactory {
    /// Create every collaborator. Fails when a configured Redis is unreachable.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let translator: Arc<dyn TranslationClient> =
            Arc::new(YandexDictionaryService::new(settings.translation.clone())?);

        let (speech, speech_enabled): (Arc<dyn SpeechSynthesizer>, bool) = match &settings.speech {
            Some(config) => (Arc::new(SberSpeechService::new(config.clone())?), true),
            None => {
                warn!("Speech synthesis is not configured, pronunciation disabled");
                (Arc::new(DisabledSpeech), false)
            }
        };

        let (contexts, redis): (Arc<dyn ConversationStore>, Option<StateStorage>) = match &settings.redis {
            Some(config) => {
                let storage = StateStorage::new(config.clone()).await?;
                storage.test_connection().await?;
                info!("Conversation state stored in Redis");
                (Arc::new(storage.clone()), Some(storage))
            }
            None => {
                warn!("Redis is not configured, conversation state kept in memory");
                (Arc::new(MemoryStateStorage::new()), None)
            }
        };

        Ok(Self {
            translator,
            speech,
            contexts,
            redis,
            speech_enabled,
        })
    }

    /// Assemble the tutor on top of the word pool
    pub fn tutor(
        &self,
        settings: &Settings,
        store: Arc<dyn WordPoolStore>,
        notifier: Arc<dyn ExpiryNotifier>,
        i18n: Arc<I18n>,
    ) -> Result<TutorService> {
        TutorService::new(
            TutorDeps {
                store,
                translator: self.translator.clone(),
                speech: self.speech.clone(),
                contexts: self.contexts.clone(),
                notifier,
                clock: Arc::new(SystemClock),
                i18n,
            },
            settings,
        )
    }

    /// Health check for the collaborators
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let redis_healthy = match &self.redis {
            Some(storage) => Some(storage.test_connection().await.is_ok()),
            None => None,
        };

        ServiceHealthStatus {
            redis_healthy,
            speech_enabled: self.speech_enabled,
        }
    }
}

/// Health status of the collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHealthStatus {
    /// `None` when Redis is not configured
    pub redis_healthy: Option<bool>,
    pub speech_enabled: bool,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.redis_healthy != Some(false)
    }

    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.redis_healthy == Some(false) {
            issues.push("Redis connection failed".to_string());
        }
        if !self.speech_enabled {
            issues.push("Speech synthesis disabled".to_string());
        }

        issues
    }
}
