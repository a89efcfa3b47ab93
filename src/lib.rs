//! WordBuddy Telegram Bot
//!
//! A Telegram bot for learning English vocabulary. This library provides the
//! quiz engine, session lifecycle, add/delete word dialogues, statistics and
//! the clients of the dictionary and speech services, with multi-language
//! support.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod quiz;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{Result, WordBuddyError};

// Re-export main components for easy access
pub use database::{DatabaseService, MemoryWordPool, WordPoolStore};
pub use i18n::I18n;
pub use quiz::QuizEngine;
pub use services::{ServiceFactory, TutorService};
pub use state::{ConversationFlow, SessionController};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
