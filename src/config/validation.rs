//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{WordBuddyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_translation_config(&settings.translation)?;
    validate_session_config(&settings.session)?;
    validate_flow_config(&settings.flow)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    if let Some(ref redis_config) = settings.redis {
        validate_redis_config(redis_config)?;
    }

    if let Some(ref speech_config) = settings.speech {
        validate_speech_config(speech_config)?;
    }

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(WordBuddyError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(WordBuddyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(WordBuddyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(WordBuddyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(WordBuddyError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate dictionary API configuration
fn validate_translation_config(config: &super::TranslationConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(WordBuddyError::Config(
            "Translation API URL is required".to_string()
        ));
    }

    if config.api_key.is_empty() {
        return Err(WordBuddyError::Config(
            "Translation API key is required".to_string()
        ));
    }

    if config.direction.split('-').filter(|part| !part.is_empty()).count() != 2 {
        return Err(WordBuddyError::Config(
            format!("Invalid translation direction: {}", config.direction)
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(WordBuddyError::Config(
            "Translation timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate speech API configuration
fn validate_speech_config(config: &super::SpeechConfig) -> Result<()> {
    if config.client_id.is_empty() || config.client_secret.is_empty() {
        return Err(WordBuddyError::Config(
            "Speech client id and secret are required when speech is enabled".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(WordBuddyError::Config(
            "Speech timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate quiz session configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.timeout_seconds == 0 {
        return Err(WordBuddyError::Config(
            "Session timeout must be greater than 0".to_string()
        ));
    }

    if config.distractors == 0 {
        return Err(WordBuddyError::Config(
            "At least one distractor is required".to_string()
        ));
    }

    Ok(())
}

/// Validate word dialogue configuration
fn validate_flow_config(config: &super::FlowConfig) -> Result<()> {
    regex::Regex::new(&config.source_word_pattern)
        .map_err(|e| WordBuddyError::Config(format!("Invalid source word pattern: {}", e)))?;

    if config.ttl_seconds == 0 {
        return Err(WordBuddyError::Config(
            "Dialogue TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(WordBuddyError::Config(
            "Default language is required".to_string()
        ));
    }

    if config.supported_languages.is_empty() {
        return Err(WordBuddyError::Config(
            "At least one supported language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(WordBuddyError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(WordBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(WordBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
