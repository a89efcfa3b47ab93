//! Sber SaluteSpeech text-to-speech client
//!
//! Authenticates with OAuth client credentials, caches the access token and
//! synthesizes short texts to Opus audio for Telegram voice messages.

use std::time::Duration;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::SpeechConfig;
use crate::utils::errors::{Result, SpeechError, SpeechResult, WordBuddyError};
use crate::utils::logging::log_api_error;

/// Turns text into audio bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> SpeechResult<Vec<u8>>;
}

/// Used when no speech credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSpeech;

#[async_trait]
impl SpeechSynthesizer for DisabledSpeech {
    async fn synthesize(&self, _text: &str) -> SpeechResult<Vec<u8>> {
        Err(SpeechError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct SberSpeechService {
    client: Client,
    config: SpeechConfig,
    token: Mutex<Option<CachedToken>>,
}

impl SberSpeechService {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("WordBuddy-Bot/1.0")
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(WordBuddyError::Http)?;

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    /// Cached access token, fetching a new one when missing or expired
    async fn access_token(&self) -> SpeechResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.config.client_id, self.config.client_secret));

        let response = self.client
            .post(&self.config.auth_url)
            .header("Authorization", format!("Basic {}", credentials))
            .header("Accept", "application/json")
            .header("RqUID", Uuid::new_v4().to_string())
            .form(&[("scope", self.config.scope.as_str())])
            .send()
            .await
            .map_err(|e| map_request_error(e, SpeechError::AuthenticationFailed))?;

        if !response.status().is_success() {
            let status = response.status();
            log_api_error("salute_speech_oauth", &format!("HTTP {}", status), None);
            return Err(SpeechError::AuthenticationFailed(format!("HTTP {}", status)));
        }

        let token: TokenResponse = response.json().await
            .map_err(|e| SpeechError::AuthenticationFailed(e.to_string()))?;

        info!("Speech access token obtained");
        let value = token.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(self.config.token_ttl_seconds),
        });
        Ok(value)
    }
}

#[async_trait]
impl SpeechSynthesizer for SberSpeechService {
    async fn synthesize(&self, text: &str) -> SpeechResult<Vec<u8>> {
        let token = self.access_token().await?;
        let url = format!("{}/text:synthesize", self.config.api_url.trim_end_matches('/'));
        debug!(chars = text.chars().count(), voice = %self.config.voice, "Synthesizing speech");

        let response = self.client
            .post(&url)
            .query(&[("format", "opus"), ("voice", self.config.voice.as_str())])
            .bearer_auth(token)
            .header("Content-Type", "application/text")
            .header("RqUID", Uuid::new_v4().to_string())
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| map_request_error(e, SpeechError::SynthesisFailed))?;

        if !response.status().is_success() {
            let status = response.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                *self.token.lock().await = None;
            }
            log_api_error("salute_speech", &format!("HTTP {}", status), Some(text));
            return Err(SpeechError::SynthesisFailed(format!("HTTP {}", status)));
        }

        let audio = response.bytes().await
            .map_err(|e| SpeechError::SynthesisFailed(e.to_string()))?;
        Ok(audio.to_vec())
    }
}

fn map_request_error(e: reqwest::Error, otherwise: fn(String) -> SpeechError) -> SpeechError {
    log_api_error("salute_speech", &e.to_string(), None);
    if e.is_timeout() {
        SpeechError::Timeout
    } else {
        otherwise(e.to_string())
    }
}
