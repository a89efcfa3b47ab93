//! Error handling for WordBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for WordBuddy application
#[derive(Error, Debug)]
pub enum WordBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Translation API error: {0}")]
    Translation(#[from] TranslationError),

    #[error("Speech API error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Already in your dictionary: {term}")]
    Duplicate { term: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No question in progress for user {user_id}")]
    StaleSession { user_id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Translation API specific errors
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    RequestFailed(String),

    #[error("Translation API timeout")]
    Timeout,

    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),

    #[error("No translation found for '{0}'")]
    NotFound(String),
}

/// Speech synthesis specific errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Speech authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Speech API timeout")]
    Timeout,

    #[error("Speech synthesis is not configured")]
    Disabled,
}

/// Result type alias for WordBuddy operations
pub type Result<T> = std::result::Result<T, WordBuddyError>;

/// Result type alias for translation operations
pub type TranslationResult<T> = std::result::Result<T, TranslationError>;

/// Result type alias for speech operations
pub type SpeechResult<T> = std::result::Result<T, SpeechError>;

/// Coarse classification used to pick the user-facing reaction to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, re-prompt the same step
    Validation,
    /// Word or translation already present, re-prompt
    Duplicate,
    /// Delete target, translation or quiz target missing
    NotFound,
    /// An answer arrived without a tracked question
    StaleSession,
    /// Store or collaborator unreachable or failing
    Infrastructure,
    /// Startup configuration problem
    Config,
}

impl WordBuddyError {
    /// Classify the error into the user-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            WordBuddyError::Validation(_) => ErrorKind::Validation,
            WordBuddyError::Duplicate { .. } => ErrorKind::Duplicate,
            WordBuddyError::NotFound(_) => ErrorKind::NotFound,
            WordBuddyError::Translation(TranslationError::NotFound(_)) => ErrorKind::NotFound,
            WordBuddyError::StaleSession { .. } => ErrorKind::StaleSession,
            WordBuddyError::InvalidStateTransition { .. } => ErrorKind::StaleSession,
            WordBuddyError::Config(_) | WordBuddyError::Migration(_) => ErrorKind::Config,
            _ => ErrorKind::Infrastructure,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            WordBuddyError::Database(_) => true,
            WordBuddyError::Migration(_) => false,
            WordBuddyError::Telegram(_) => true,
            WordBuddyError::Translation(_) => true,
            WordBuddyError::Speech(_) => true,
            WordBuddyError::Config(_) => false,
            WordBuddyError::Validation(_) => true,
            WordBuddyError::Duplicate { .. } => true,
            WordBuddyError::NotFound(_) => true,
            WordBuddyError::StaleSession { .. } => true,
            WordBuddyError::InvalidStateTransition { .. } => true,
            WordBuddyError::Redis(_) => true,
            WordBuddyError::Http(_) => true,
            WordBuddyError::Serialization(_) => false,
            WordBuddyError::Io(_) => true,
            WordBuddyError::Timeout(_) => true,
            WordBuddyError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Duplicate | ErrorKind::NotFound => ErrorSeverity::Info,
            ErrorKind::StaleSession => ErrorSeverity::Warning,
            ErrorKind::Config => ErrorSeverity::Critical,
            ErrorKind::Infrastructure => ErrorSeverity::Error,
        }
    }

    /// Translation key of the message shown to the user for this error
    pub fn user_message_key(&self) -> &'static str {
        match self {
            WordBuddyError::Validation(_) => "errors.validation",
            WordBuddyError::Duplicate { .. } => "errors.duplicate",
            WordBuddyError::Translation(TranslationError::NotFound(_)) => "errors.translation_not_found",
            WordBuddyError::NotFound(_) => "errors.not_found",
            WordBuddyError::StaleSession { .. } | WordBuddyError::InvalidStateTransition { .. } => {
                "errors.stale_session"
            }
            WordBuddyError::Speech(SpeechError::Disabled) => "errors.speech_disabled",
            _ => "errors.generic",
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
