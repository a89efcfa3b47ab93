//! Test context for unified test setup
//!
//! Builds a tutor over in-memory collaborators so that whole user journeys
//! can run without PostgreSQL, Redis or network access.

use std::sync::Arc;

use chrono::Utc;
use WordBuddy::config::Settings;
use WordBuddy::database::MemoryWordPool;
use WordBuddy::i18n::I18n;
use WordBuddy::quiz::Question;
use WordBuddy::services::speech::{DisabledSpeech, SpeechSynthesizer};
use WordBuddy::services::tutor::{Reply, TutorDeps, TutorService, UserEvent, UserRef};
use WordBuddy::state::flow::ConversationFlow;
use WordBuddy::state::session::SessionController;
use WordBuddy::state::storage::MemoryStateStorage;
use WordBuddy::utils::clock::ManualClock;

use super::mocks::{EchoSpeech, MockTranslator, RecordingNotifier};
use super::test_data::SHARED_WORDS;

/// Knobs for the test context
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub shared_words: Vec<(&'static str, &'static str)>,
    pub speech_enabled: bool,
    pub max_attempts: u32,
    pub timeout_seconds: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            shared_words: SHARED_WORDS.to_vec(),
            speech_enabled: true,
            max_attempts: 0,
            timeout_seconds: 900,
        }
    }
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub settings: Settings,
    pub pool: Arc<MemoryWordPool>,
    pub translator: Arc<MockTranslator>,
    pub contexts: Arc<MemoryStateStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub speech: Arc<EchoSpeech>,
    pub clock: Arc<ManualClock>,
    pub i18n: Arc<I18n>,
    pub tutor: Arc<TutorService>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::new_with_config(TestConfig::default()).await
    }

    pub async fn new_with_config(config: TestConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let settings = test_settings(&config);
        let pool = Arc::new(MemoryWordPool::with_shared_words(&config.shared_words));
        let translator = Arc::new(MockTranslator::new(&[("яблоко", "apple"), ("груша", "pear"), ("котик", "cat")]));
        translator.insert("мяч", &["ball", "sphere"]);
        let contexts = Arc::new(MemoryStateStorage::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let speech = Arc::new(EchoSpeech::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let mut i18n = I18n::new(&settings.i18n);
        i18n.load_translations().await.expect("Failed to load translations");
        let i18n = Arc::new(i18n);

        let synthesizer: Arc<dyn SpeechSynthesizer> = if config.speech_enabled {
            speech.clone()
        } else {
            Arc::new(DisabledSpeech)
        };

        let tutor = Arc::new(TutorService::new(
            TutorDeps {
                store: pool.clone(),
                translator: translator.clone(),
                speech: synthesizer,
                contexts: contexts.clone(),
                notifier: notifier.clone(),
                clock: clock.clone(),
                i18n: i18n.clone(),
            },
            &settings,
        )
        .expect("Failed to build tutor"));

        Self {
            settings,
            pool,
            translator,
            contexts,
            notifier,
            speech,
            clock,
            i18n,
            tutor,
        }
    }

    /// A dialogue machine sharing this context's collaborators and sessions
    pub fn flow(&self) -> ConversationFlow {
        ConversationFlow::new(
            self.pool.clone(),
            self.translator.clone(),
            self.contexts.clone(),
            self.sessions().clone(),
            self.clock.clone(),
            &self.settings.flow,
            &self.settings.translation.direction,
        )
        .expect("Failed to build flow")
    }

    pub fn sessions(&self) -> &SessionController {
        self.tutor.sessions()
    }

    pub async fn send(&self, user: &UserRef, event: UserEvent) -> Vec<Reply> {
        self.tutor.handle(user, event).await
    }

    pub async fn text(&self, user: &UserRef, text: &str) -> Vec<Reply> {
        self.send(user, UserEvent::Text(text.to_string())).await
    }

    pub fn current_question(&self, user: &UserRef) -> Question {
        self.sessions()
            .current_question(user.id)
            .expect("No question on screen")
    }

    /// Press the button with the right answer
    pub async fn answer_correctly(&self, user: &UserRef) -> Vec<Reply> {
        let question = self.current_question(user);
        let option = question
            .options
            .iter()
            .find(|o| o.text == question.correct_answer)
            .expect("Correct option missing");
        self.send(user, UserEvent::Answer { render_id: option.render_id.clone() }).await
    }

    /// Press a button with a wrong answer
    pub async fn answer_wrong(&self, user: &UserRef) -> Vec<Reply> {
        let question = self.current_question(user);
        let option = question
            .options
            .iter()
            .find(|o| o.text != question.correct_answer)
            .expect("No wrong option");
        self.send(user, UserEvent::Answer { render_id: option.render_id.clone() }).await
    }

    /// Translated text as the user would see it
    pub fn t(&self, key: &str) -> String {
        self.i18n.t(key, "ru", None)
    }
}

/// Settings used by every test
pub fn test_settings(config: &TestConfig) -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = test_bot_token();
    settings.translation.api_key = "test-dictionary-key".to_string();
    settings.session.timeout_seconds = config.timeout_seconds;
    settings.flow.max_attempts = config.max_attempts;
    settings.logging.level = "debug".to_string();
    settings
}

pub fn test_bot_token() -> String {
    "12345:test_token".to_string()
}

/// Texts of all text replies, in order
pub fn texts(replies: &[Reply]) -> Vec<String> {
    replies
        .iter()
        .filter_map(|r| match r {
            Reply::Text { text, .. } | Reply::Question { text, .. } | Reply::Toast { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn has_question(replies: &[Reply]) -> bool {
    replies.iter().any(|r| matches!(r, Reply::Question { .. }))
}
