//! Translation catalogue
//!
//! One JSON file per language under the translations directory. Keys are
//! dotted paths into the file; a value is a template string, a plural table
//! (`one`/`few`/`many`/`other`) or an array of phrase variants. Lookups fall
//! back to the default language, then to the key itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::I18nConfig;
use crate::utils::errors::{Result, WordBuddyError};

/// Named values substituted into `{name}` placeholders
pub type TranslationParams = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct I18n {
    catalogues: HashMap<String, Map<String, Value>>,
    default_language: String,
    supported_languages: Vec<String>,
    translations_dir: PathBuf,
}

impl I18n {
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            catalogues: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
            translations_dir: PathBuf::from(&config.translations_dir),
        }
    }

    /// Load `<lang>.json` for every supported language.
    ///
    /// A missing or malformed file for the default language is a
    /// configuration error; other languages are skipped with a warning.
    pub async fn load_translations(&mut self) -> Result<()> {
        let translations_dir = self.translations_dir.clone();
        if !translations_dir.exists() {
            warn!(dir = %translations_dir.display(), "Translations directory not found, creating it");
            fs::create_dir_all(&translations_dir).await?;
        }

        for lang in self.supported_languages.clone() {
            let file_path = translations_dir.join(format!("{}.json", lang));
            let is_default = lang == self.default_language;

            if !file_path.exists() {
                warn!(file = %file_path.display(), "Translation file not found");
                if is_default {
                    return Err(WordBuddyError::Config(format!(
                        "Default language translation file not found: {}",
                        file_path.display()
                    )));
                }
                continue;
            }

            match read_catalogue(&file_path).await {
                Ok(catalogue) => {
                    info!(lang = %lang, keys = catalogue.len(), "Loaded translations");
                    self.catalogues.insert(lang, catalogue);
                }
                Err(e) if is_default => {
                    return Err(WordBuddyError::Config(format!(
                        "Failed to load default language translations: {}",
                        e
                    )));
                }
                Err(e) => error!(lang = %lang, error = %e, "Failed to load translations"),
            }
        }

        Ok(())
    }

    /// Translated text for `key`, with `{name}` placeholders filled from `params`
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        match self.resolve(key, lang) {
            Some(value) => fill(&template_of(value), params),
            None => {
                warn!(key = key, lang = lang, "Translation key not found");
                key.to_string()
            }
        }
    }

    /// Plural-aware variant of [`I18n::t`]; `{count}` is always available
    pub fn tp(&self, key: &str, lang: &str, count: i64, params: Option<&TranslationParams>) -> String {
        let lang = self.effective_language(lang);
        let plural_key = format!("{}.{}", key, plural_category(count, lang));

        let mut params = params.cloned().unwrap_or_default();
        params.insert("count".to_string(), count.to_string());
        self.t(&plural_key, lang, Some(&params))
    }

    /// Phrase variants stored as a JSON array; a single string is a one-item list
    pub fn list(&self, key: &str, lang: &str) -> Vec<String> {
        match self.resolve(key, lang) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => {
                warn!(key = key, lang = lang, "Translation list not found");
                Vec::new()
            }
        }
    }

    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Supported language for a Telegram locale such as `en-US`, else the default
    pub fn detect_user_language(&self, telegram_lang: Option<&str>) -> String {
        telegram_lang
            .and_then(|locale| locale.split('-').next())
            .filter(|code| self.supported_languages.iter().any(|l| l.as_str() == *code))
            .unwrap_or(self.default_language.as_str())
            .to_string()
    }

    fn effective_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.catalogues.contains_key(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    /// Value at `key` in the user's language, falling back to the default language
    fn resolve(&self, key: &str, lang: &str) -> Option<&Value> {
        let lang = self.effective_language(lang);
        self.lookup(key, lang).or_else(|| {
            if lang == self.default_language {
                None
            } else {
                debug!(key = key, lang = lang, "Falling back to default language");
                self.lookup(key, &self.default_language)
            }
        })
    }

    fn lookup(&self, key: &str, lang: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = self.catalogues.get(lang)?.get(parts.next()?)?;
        parts.try_fold(first, |value, part| value.get(part))
    }
}

async fn read_catalogue(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path).await?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(WordBuddyError::Config(format!(
            "Translation file is not a JSON object: {}",
            path.display()
        ))),
    }
}

/// Text of a value; plural tables without the exact form use `other`
fn template_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(forms) => forms
            .get("other")
            .or_else(|| forms.values().next())
            .map(template_of)
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn fill(template: &str, params: Option<&TranslationParams>) -> String {
    let mut text = template.to_string();
    for (name, value) in params.into_iter().flatten() {
        text = text.replace(&format!("{{{}}}", name), value);
    }
    text
}

/// CLDR plural category for `count`; Russian distinguishes one/few/many
fn plural_category(count: i64, lang: &str) -> &'static str {
    match lang {
        "ru" => {
            let n = count.abs();
            match (n % 10, n % 100) {
                (1, tail) if tail != 11 => "one",
                (2..=4, tail) if !(12..=14).contains(&tail) => "few",
                _ => "many",
            }
        }
        _ if count == 1 => "one",
        _ => "other",
    }
}
