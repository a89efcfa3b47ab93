//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub translation: TranslationConfig,
    pub speech: Option<SpeechConfig>,
    pub session: SessionConfig,
    pub flow: FlowConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Redis configuration for conversation state.
///
/// When absent, conversation state is kept in process memory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Dictionary lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    pub api_url: String,
    pub api_key: String,
    /// Lookup direction, source-target, e.g. `ru-en`
    pub direction: String,
    pub timeout_seconds: u64,
}

/// Text-to-speech configuration. Pronunciation is disabled when absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub auth_url: String,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub voice: String,
    pub timeout_seconds: u64,
    pub token_ttl_seconds: u64,
    pub accept_invalid_certs: bool,
}

/// Quiz session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Inactivity timeout after which a session is closed
    pub timeout_seconds: u64,
    /// Tolerance added to the end of the session window when counting learned words
    pub count_buffer_ms: u64,
    /// Number of wrong options shown with each question
    pub distractors: usize,
}

/// Add/delete word dialogue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowConfig {
    /// Allowed alphabet for words typed by the learner
    pub source_word_pattern: String,
    /// Re-prompts allowed before the dialogue gives up, 0 for unlimited
    pub max_attempts: u32,
    /// Lifetime of an idle dialogue
    pub ttl_seconds: u64,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub translations_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from defaults, configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("WORDBUDDY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::WordBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            prefix: "wordbuddy:".to_string(),
            ttl_seconds: 3600,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            auth_url: "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".to_string(),
            api_url: "https://smartspeech.sber.ru/rest/v1".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: "SALUTE_SPEECH_PERS".to_string(),
            voice: "Kin_24000".to_string(),
            timeout_seconds: 10,
            token_ttl_seconds: 1800,
            accept_invalid_certs: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 900,
            count_buffer_ms: 1000,
            distractors: 3,
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            source_word_pattern: r"^[а-яё]+(-[а-яё]+)*$".to_string(),
            max_attempts: 0,
            ttl_seconds: 3600,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/wordbuddy".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 5,
            },
            redis: None,
            translation: TranslationConfig {
                api_url: "https://dictionary.yandex.net/api/v1/dicservice.json".to_string(),
                api_key: String::new(),
                direction: "ru-en".to_string(),
                timeout_seconds: 5,
            },
            speech: None,
            session: SessionConfig::default(),
            flow: FlowConfig::default(),
            i18n: I18nConfig {
                default_language: "ru".to_string(),
                supported_languages: vec!["ru".to_string(), "en".to_string()],
                translations_dir: "translations".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
                json: false,
            },
        }
    }
}
