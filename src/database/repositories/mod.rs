//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod word;
pub mod progress;
pub mod session;

// Re-export repositories
pub use user::UserRepository;
pub use word::WordRepository;
pub use progress::ProgressRepository;
pub use session::SessionRepository;
