//! Tutor service
//!
//! Routes one typed user event to the quiz, session, dialogue and statistics
//! components and renders the outcome as typed replies. Only one of the quiz
//! session and the add/delete dialogue is live for a user at a time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::Settings;
use crate::database::WordPoolStore;
use crate::i18n::{I18n, TranslationParams};
use crate::models::CreateUserRequest;
use crate::quiz::{AnswerOption, Evaluation, FeedbackRotator, QuizEngine};
use crate::services::speech::SpeechSynthesizer;
use crate::services::stats::{daily_series, StatsAggregator};
use crate::services::translation::TranslationClient;
use crate::state::context::ConversationState;
use crate::state::flow::{ConversationFlow, FlowEvent, FlowOutcome, Rejection};
use crate::state::session::{EndReason, ExpiryNotifier, SessionController, SessionSummary};
use crate::state::storage::ConversationStore;
use crate::utils::clock::Clock;
use crate::utils::errors::{Result, SpeechError, WordBuddyError};
use crate::utils::helpers::{capitalize, format_day, format_minutes, truncate_text};
use crate::utils::logging::{log_handled_error, log_user_action};

/// Who sent the event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl UserRef {
    pub fn new(id: i64) -> Self {
        Self { id, first_name: None, username: None, language_code: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Start,
    Help,
    StartQuiz,
    Answer { render_id: String },
    Pronounce,
    EndQuiz,
    RequestReset,
    ConfirmReset,
    CancelReset,
    AddWord,
    DeleteWord,
    AddAnother,
    DeleteAnother,
    ReturnToMain,
    ListWords,
    ShowStats,
    ClearStats,
    Text(String),
}

impl UserEvent {
    fn name(&self) -> &'static str {
        match self {
            UserEvent::Start => "start",
            UserEvent::Help => "help",
            UserEvent::StartQuiz => "start_quiz",
            UserEvent::Answer { .. } => "answer",
            UserEvent::Pronounce => "pronounce",
            UserEvent::EndQuiz => "end_quiz",
            UserEvent::RequestReset => "request_reset",
            UserEvent::ConfirmReset => "confirm_reset",
            UserEvent::CancelReset => "cancel_reset",
            UserEvent::AddWord => "add_word",
            UserEvent::DeleteWord => "delete_word",
            UserEvent::AddAnother => "add_another",
            UserEvent::DeleteAnother => "delete_another",
            UserEvent::ReturnToMain => "return_to_main",
            UserEvent::ListWords => "list_words",
            UserEvent::ShowStats => "show_stats",
            UserEvent::ClearStats => "clear_stats",
            UserEvent::Text(_) => "text",
        }
    }
}

/// Keyboard attached to a text reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    MainMenu,
    AfterAdd,
    AfterDelete,
    ResetProgress,
    ConfirmReset,
    Stats,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text { text: String, keyboard: Keyboard },
    /// New quiz question with answer buttons
    Question { text: String, options: Vec<AnswerOption> },
    /// Replace the answer buttons of the last question
    EditOptions { options: Vec<AnswerOption> },
    /// Short notice on the pressed button
    Toast { text: String },
    Voice { audio: Vec<u8> },
}

impl Reply {
    fn text(text: String, keyboard: Keyboard) -> Self {
        Reply::Text { text, keyboard }
    }
}

/// Collaborators the tutor is assembled from
pub struct TutorDeps {
    pub store: Arc<dyn WordPoolStore>,
    pub translator: Arc<dyn TranslationClient>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub contexts: Arc<dyn ConversationStore>,
    pub notifier: Arc<dyn ExpiryNotifier>,
    pub clock: Arc<dyn Clock>,
    pub i18n: Arc<I18n>,
}

pub struct TutorService {
    store: Arc<dyn WordPoolStore>,
    quiz: QuizEngine,
    sessions: SessionController,
    flow: ConversationFlow,
    stats: StatsAggregator,
    speech: Arc<dyn SpeechSynthesizer>,
    feedback: FeedbackRotator,
    i18n: Arc<I18n>,
    known_users: Mutex<HashSet<i64>>,
}

impl TutorService {
    pub fn new(deps: TutorDeps, settings: &Settings) -> Result<Self> {
        let sessions = SessionController::new(
            deps.store.clone(),
            deps.clock.clone(),
            deps.notifier,
            &settings.session,
        );
        let flow = ConversationFlow::new(
            deps.store.clone(),
            deps.translator,
            deps.contexts,
            sessions.clone(),
            deps.clock,
            &settings.flow,
            &settings.translation.direction,
        )?;

        Ok(Self {
            quiz: QuizEngine::new(deps.store.clone(), settings.session.distractors),
            stats: StatsAggregator::new(deps.store.clone()),
            store: deps.store,
            sessions,
            flow,
            speech: deps.speech,
            feedback: FeedbackRotator::new(),
            i18n: deps.i18n,
            known_users: Mutex::new(HashSet::new()),
        })
    }

    pub fn sessions(&self) -> &SessionController {
        &self.sessions
    }

    /// Handle one event. Errors never escape; they become a localized message.
    pub async fn handle(&self, user: &UserRef, event: UserEvent) -> Vec<Reply> {
        let lang = self.i18n.detect_user_language(user.language_code.as_deref());
        match &event {
            UserEvent::Text(text) => log_user_action(user.id, event.name(), Some(&truncate_text(text, 64))),
            _ => log_user_action(user.id, event.name(), None),
        }

        match self.dispatch(user, event, &lang).await {
            Ok(replies) => replies,
            Err(e) => {
                log_handled_error(user.id, &e);
                let text = self.i18n.t(e.user_message_key(), &lang, None);
                match e {
                    WordBuddyError::StaleSession { .. } => vec![Reply::Toast { text }],
                    _ => vec![Reply::text(text, Keyboard::MainMenu)],
                }
            }
        }
    }

    async fn dispatch(&self, user: &UserRef, event: UserEvent, lang: &str) -> Result<Vec<Reply>> {
        self.ensure_user(user).await?;
        let user_id = user.id;

        match event {
            UserEvent::Start => {
                let name = user
                    .first_name
                    .clone()
                    .or_else(|| user.username.clone())
                    .unwrap_or_default();
                let text = self.i18n.t("commands.start", lang, Some(&params(&[("name", name)])));
                Ok(vec![Reply::text(text, Keyboard::MainMenu)])
            }
            UserEvent::Help => Ok(vec![Reply::text(self.i18n.t("commands.help", lang, None), Keyboard::MainMenu)]),
            UserEvent::StartQuiz => {
                self.flow.clear(user_id).await?;
                self.sessions.start_session(user_id);
                self.ask_next(user_id, lang).await
            }
            UserEvent::Answer { render_id } => self.answer(user_id, &render_id, lang).await,
            UserEvent::Pronounce => self.pronounce(user_id, lang).await,
            UserEvent::EndQuiz => {
                let summary = self.sessions.end_session(user_id, EndReason::Manual).await?;
                Ok(vec![match summary {
                    Some(summary) => Reply::text(self.summary_text(&summary, lang), Keyboard::MainMenu),
                    None => Reply::text(self.i18n.t("quiz.no_session", lang, None), Keyboard::MainMenu),
                }])
            }
            UserEvent::RequestReset => Ok(vec![Reply::text(self.i18n.t("reset.confirm", lang, None), Keyboard::ConfirmReset)]),
            UserEvent::ConfirmReset => {
                self.store.reset_progress(user_id).await?;
                log_user_action(user_id, "progress_reset", None);
                self.feedback.forget(user_id);
                self.flow.clear(user_id).await?;
                self.sessions.start_session(user_id);

                let mut replies = vec![Reply::Toast { text: self.i18n.t("reset.done", lang, None) }];
                replies.extend(self.ask_next(user_id, lang).await?);
                Ok(replies)
            }
            UserEvent::CancelReset => Ok(vec![Reply::text(self.i18n.t("reset.cancelled", lang, None), Keyboard::MainMenu)]),
            UserEvent::AddWord => self.enter_dialogue(user_id, FlowEvent::BeginAdd, lang).await,
            UserEvent::DeleteWord => self.enter_dialogue(user_id, FlowEvent::BeginDelete, lang).await,
            UserEvent::AddAnother => {
                self.continue_dialogue(user_id, ConversationState::AwaitingChoice, FlowEvent::AddAnother, lang)
                    .await
            }
            UserEvent::DeleteAnother => {
                self.continue_dialogue(user_id, ConversationState::AwaitingDeleteChoice, FlowEvent::DeleteAnother, lang)
                    .await
            }
            UserEvent::ReturnToMain => self.run_flow(user_id, FlowEvent::ReturnToMain, lang).await,
            UserEvent::ListWords => self.list_words(user_id, lang).await,
            UserEvent::ShowStats => self.show_stats(user_id, lang).await,
            UserEvent::ClearStats => {
                self.stats.clear_sessions(user_id).await?;
                Ok(vec![Reply::text(self.i18n.t("stats.cleared", lang, None), Keyboard::MainMenu)])
            }
            UserEvent::Text(text) => {
                self.sessions.refresh_timer(user_id);
                self.run_flow(user_id, FlowEvent::Input(text), lang).await
            }
        }
    }

    async fn ensure_user(&self, user: &UserRef) -> Result<()> {
        if self.known_users.lock().unwrap_or_else(|e| e.into_inner()).contains(&user.id) {
            return Ok(());
        }

        self.store
            .ensure_user(CreateUserRequest {
                id: user.id,
                username: user.username.clone(),
                first_name: user.first_name.clone(),
            })
            .await?;
        self.known_users.lock().unwrap_or_else(|e| e.into_inner()).insert(user.id);
        Ok(())
    }

    /// Show the next question, or close the session when the pool is exhausted
    async fn ask_next(&self, user_id: i64, lang: &str) -> Result<Vec<Reply>> {
        match self.quiz.next_question(user_id).await? {
            Some(question) => {
                let text = self.i18n.t("quiz.prompt", lang, Some(&params(&[("word", question.prompt_term.clone())])));
                let options = question.options.clone();
                self.sessions.set_question(user_id, question);
                Ok(vec![Reply::Question { text, options }])
            }
            None => {
                let mut replies = Vec::new();
                if let Some(summary) = self.sessions.end_session(user_id, EndReason::Exhausted).await? {
                    replies.push(Reply::text(self.summary_text(&summary, lang), Keyboard::MainMenu));
                }
                replies.push(Reply::text(self.i18n.t("quiz.all_learned", lang, None), Keyboard::ResetProgress));
                Ok(replies)
            }
        }
    }

    async fn answer(&self, user_id: i64, render_id: &str, lang: &str) -> Result<Vec<Reply>> {
        let question = self.sessions.current_question(user_id);
        let submitted = self
            .quiz
            .answer_by_render_id(user_id, question.as_ref(), render_id)?
            .to_string();
        let (Some(mut question), Some(start)) = (question, self.sessions.session_start(user_id)) else {
            return Err(WordBuddyError::StaleSession { user_id });
        };
        self.sessions.refresh_timer(user_id);

        match self.quiz.evaluate(user_id, &question, start, &submitted).await? {
            Evaluation::Correct { .. } => {
                let phrases = self.i18n.list("quiz.correct", lang);
                let mut replies = Vec::new();
                if let Some(text) = self.feedback.correct_feedback(user_id, &phrases) {
                    replies.push(Reply::Toast { text });
                }
                self.sessions.clear_question(user_id);
                replies.extend(self.ask_next(user_id, lang).await?);
                Ok(replies)
            }
            Evaluation::Incorrect { options } => {
                let phrases = self.i18n.list("quiz.incorrect", lang);
                let mut replies = Vec::new();
                if let Some(text) = self.feedback.incorrect_feedback(user_id, &phrases) {
                    replies.push(Reply::Toast { text });
                }
                question.options = options.clone();
                self.sessions.set_question(user_id, question);
                replies.push(Reply::EditOptions { options });
                Ok(replies)
            }
        }
    }

    async fn pronounce(&self, user_id: i64, lang: &str) -> Result<Vec<Reply>> {
        let question = self
            .sessions
            .current_question(user_id)
            .ok_or(WordBuddyError::StaleSession { user_id })?;
        self.sessions.refresh_timer(user_id);

        match self.speech.synthesize(&question.prompt_term).await {
            Ok(audio) => Ok(vec![Reply::Voice { audio }]),
            Err(SpeechError::Disabled) => Ok(vec![Reply::Toast { text: self.i18n.t("errors.speech_disabled", lang, None) }]),
            Err(e) => {
                log_handled_error(user_id, &WordBuddyError::Speech(e));
                Ok(vec![Reply::Toast { text: self.i18n.t("errors.generic", lang, None) }])
            }
        }
    }

    /// Starting a dialogue closes a running quiz first
    async fn enter_dialogue(&self, user_id: i64, event: FlowEvent, lang: &str) -> Result<Vec<Reply>> {
        let mut replies = Vec::new();
        if let Some(summary) = self.sessions.end_session(user_id, EndReason::Manual).await? {
            replies.push(Reply::text(self.summary_text(&summary, lang), Keyboard::MainMenu));
        }
        replies.extend(self.run_flow(user_id, event, lang).await?);
        Ok(replies)
    }

    /// A choice button only continues the dialogue it belongs to; from any
    /// other step it opens a new one, closing a running quiz first
    async fn continue_dialogue(
        &self,
        user_id: i64,
        choice: ConversationState,
        event: FlowEvent,
        lang: &str,
    ) -> Result<Vec<Reply>> {
        if self.flow.current_state(user_id).await? == choice {
            self.run_flow(user_id, event, lang).await
        } else {
            self.enter_dialogue(user_id, event, lang).await
        }
    }

    async fn run_flow(&self, user_id: i64, event: FlowEvent, lang: &str) -> Result<Vec<Reply>> {
        let outcome = self.flow.handle(user_id, event).await?;
        debug!(user_id = user_id, outcome = ?outcome, "Dialogue step handled");

        let replies = match outcome {
            FlowOutcome::PromptWord => vec![Reply::text(self.i18n.t("add.prompt", lang, None), Keyboard::MainMenu)],
            FlowOutcome::WordAdded { source_term, target_term, total } => {
                let text = self.i18n.t(
                    "add.added",
                    lang,
                    Some(&params(&[("source", source_term), ("target", target_term), ("count", total.to_string())])),
                );
                vec![Reply::text(text, Keyboard::AfterAdd)]
            }
            FlowOutcome::Rejected(rejection) => vec![Reply::text(self.rejection_text(&rejection, lang), Keyboard::None)],
            FlowOutcome::TooManyAttempts(rejection) => vec![
                Reply::text(self.rejection_text(&rejection, lang), Keyboard::None),
                Reply::text(self.i18n.t("add.too_many_attempts", lang, None), Keyboard::MainMenu),
            ],
            FlowOutcome::PromptDeleteTarget => vec![Reply::text(self.i18n.t("delete.prompt", lang, None), Keyboard::MainMenu)],
            FlowOutcome::Deleted { term } => {
                let text = self.i18n.t("delete.deleted", lang, Some(&params(&[("word", term)])));
                vec![Reply::text(text, Keyboard::AfterDelete)]
            }
            FlowOutcome::DeleteMissed { term } => {
                let text = self.i18n.t("delete.not_found", lang, Some(&params(&[("word", term)])));
                vec![Reply::text(text, Keyboard::AfterDelete)]
            }
            FlowOutcome::ChoicePending(state) => {
                let keyboard = match state {
                    ConversationState::AwaitingDeleteChoice => Keyboard::AfterDelete,
                    _ => Keyboard::AfterAdd,
                };
                vec![Reply::text(self.i18n.t("flow.choose", lang, None), keyboard)]
            }
            FlowOutcome::ReturnedToMain { session } => {
                let mut replies = Vec::new();
                if let Some(summary) = session {
                    replies.push(Reply::text(self.summary_text(&summary, lang), Keyboard::MainMenu));
                }
                replies.push(Reply::text(self.i18n.t("messages.main_menu", lang, None), Keyboard::MainMenu));
                replies
            }
            FlowOutcome::NotInDialogue => vec![Reply::text(self.i18n.t("messages.use_menu", lang, None), Keyboard::MainMenu)],
        };
        Ok(replies)
    }

    async fn list_words(&self, user_id: i64, lang: &str) -> Result<Vec<Reply>> {
        let words = self.stats.list_words(user_id).await?;
        if words.is_empty() {
            return Ok(vec![Reply::text(self.i18n.t("words.empty", lang, None), Keyboard::MainMenu)]);
        }

        let count_text = self.i18n.tp("words.count", lang, words.len() as i64, None);
        let mut lines = vec![self.i18n.t("words.header", lang, Some(&params(&[("count_text", count_text)])))];
        lines.extend(
            words
                .iter()
                .map(|w| format!("• {} — {}", capitalize(&w.target_term), capitalize(&w.source_term))),
        );
        Ok(vec![Reply::text(lines.join("\n"), Keyboard::MainMenu)])
    }

    async fn show_stats(&self, user_id: i64, lang: &str) -> Result<Vec<Reply>> {
        let summary = self.stats.summarize(user_id).await?;
        let mut text = self.i18n.t(
            "stats.summary",
            lang,
            Some(&params(&[
                ("learned", summary.learned_words.to_string()),
                ("personal", summary.personal_words.to_string()),
                ("sessions", summary.sessions.len().to_string()),
                ("minutes", format_minutes(summary.total_duration_secs())),
            ])),
        );

        let series = daily_series(&summary);
        if series.is_empty() {
            text.push_str("\n\n");
            text.push_str(&self.i18n.t("stats.no_sessions", lang, None));
            return Ok(vec![Reply::text(text, Keyboard::MainMenu)]);
        }

        text.push_str("\n\n");
        text.push_str(&self.i18n.t("stats.daily_header", lang, None));
        for day in series.iter().rev().take(7).rev() {
            let line = self.i18n.t(
                "stats.daily_line",
                lang,
                Some(&params(&[
                    ("date", day.date.format("%d.%m.%Y").to_string()),
                    ("sessions", day.sessions.to_string()),
                    ("learned", day.learned_words.to_string()),
                    ("minutes", format_minutes(day.duration_secs)),
                ])),
            );
            text.push('\n');
            text.push_str(&line);
        }
        Ok(vec![Reply::text(text, Keyboard::Stats)])
    }

    fn rejection_text(&self, rejection: &Rejection, lang: &str) -> String {
        match rejection {
            Rejection::NotSingleWord => self.i18n.t("add.errors.not_single_word", lang, None),
            Rejection::WrongAlphabet => self.i18n.t("add.errors.wrong_alphabet", lang, None),
            Rejection::Duplicate { term } => {
                self.i18n.t("add.errors.duplicate", lang, Some(&params(&[("word", term.clone())])))
            }
            Rejection::TranslationNotFound { term } => {
                self.i18n.t("add.errors.translation_not_found", lang, Some(&params(&[("word", term.clone())])))
            }
        }
    }

    fn summary_text(&self, summary: &SessionSummary, lang: &str) -> String {
        session_summary_text(&self.i18n, summary, lang)
    }
}

/// Render a finished session for the user
pub fn session_summary_text(i18n: &I18n, summary: &SessionSummary, lang: &str) -> String {
    let key = match summary.reason {
        EndReason::Timeout => "quiz.session_expired",
        EndReason::Manual | EndReason::Exhausted => "quiz.session_summary",
    };
    let mut text = i18n.t(
        key,
        lang,
        Some(&params(&[
            ("minutes", format_minutes(summary.duration_secs)),
            ("count", summary.learned_words.to_string()),
        ])),
    );
    if summary.learned_words > 0 {
        text.push_str(&format!(" ({})", format_day(summary.started_at)));
    }
    text
}

fn params(pairs: &[(&str, String)]) -> TranslationParams {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
