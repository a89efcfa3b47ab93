//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the WordBuddy application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{Result, WordBuddyError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must live as long as `main`.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "wordbuddy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| WordBuddyError::Config(format!("Invalid log filter: {}", e)))?;

    let file_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(non_blocking).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| WordBuddyError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log quiz session lifecycle events
pub fn log_session_event(user_id: i64, event: &str, duration_secs: Option<i64>, learned_words: Option<i64>) {
    info!(
        user_id = user_id,
        event = event,
        duration_secs = duration_secs,
        learned_words = learned_words,
        "Session event occurred"
    );
}

/// Log dialogue state transitions
pub fn log_transition(user_id: i64, from: &str, to: &str) {
    debug!(
        user_id = user_id,
        from = from,
        to = to,
        "Conversation state transition"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}

/// Log a recoverable error that was turned into a user-facing message
pub fn log_handled_error(user_id: i64, error: &WordBuddyError) {
    match error.severity() {
        crate::utils::errors::ErrorSeverity::Info => {
            debug!(user_id = user_id, error = %error, "Input rejected");
        }
        crate::utils::errors::ErrorSeverity::Warning => {
            warn!(user_id = user_id, error = %error, "Recoverable error");
        }
        severity => {
            error!(
                user_id = user_id,
                error = %error,
                severity = %severity,
                recoverable = error.is_recoverable(),
                "Request failed"
            );
        }
    }
}
