//! Internationalization module
//!
//! This module handles multi-language support for the WordBuddy bot.
//! It provides translation loading, language detection, message formatting,
//! phrase lists and pluralization support for multiple languages.

pub mod loader;

// Re-export commonly used i18n components
pub use loader::{I18n, TranslationParams};
