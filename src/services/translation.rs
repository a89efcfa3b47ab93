//! Yandex Dictionary translation client
//!
//! Looks up dictionary translations for a single term. Every `def[].tr[].text`
//! of the response is a candidate, in the order the API returns them.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::config::TranslationConfig;
use crate::utils::errors::{Result, TranslationError, TranslationResult, WordBuddyError};
use crate::utils::logging::log_api_error;

/// Source-to-target dictionary lookup
#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// Translation candidates for `term`. An empty result is `TranslationError::NotFound`.
    async fn lookup(&self, term: &str, direction: &str) -> TranslationResult<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    def: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    tr: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct YandexDictionaryService {
    client: Client,
    config: TranslationConfig,
}

impl YandexDictionaryService {
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("WordBuddy-Bot/1.0")
            .build()
            .map_err(WordBuddyError::Http)?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TranslationClient for YandexDictionaryService {
    async fn lookup(&self, term: &str, direction: &str) -> TranslationResult<Vec<String>> {
        let url = format!("{}/lookup", self.config.api_url.trim_end_matches('/'));
        debug!(term = %term, direction = %direction, "Looking up translation");

        let response = self.client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str()), ("text", term), ("lang", direction)])
            .send()
            .await
            .map_err(|e| {
                log_api_error("yandex_dictionary", &e.to_string(), Some(term));
                if e.is_timeout() {
                    TranslationError::Timeout
                } else {
                    TranslationError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            log_api_error("yandex_dictionary", &format!("HTTP {}", status), Some(&error_text));
            return Err(TranslationError::RequestFailed(format!("HTTP {}: {}", status, error_text)));
        }

        let body: LookupResponse = response.json().await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        let candidates: Vec<String> = body.def
            .into_iter()
            .flat_map(|d| d.tr)
            .map(|t| t.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if candidates.is_empty() {
            return Err(TranslationError::NotFound(term.to_string()));
        }

        debug!(term = %term, candidates = candidates.len(), "Translation found");
        Ok(candidates)
    }
}
