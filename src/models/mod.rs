//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod word;
pub mod progress;
pub mod session;

// Re-export commonly used models
pub use user::{User, CreateUserRequest};
pub use word::{Word, WordKind, WordRef, SharedWord, PersonalWord};
pub use progress::ProgressRecord;
pub use session::{SessionRecord, CreateSessionRecordRequest};
