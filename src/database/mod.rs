//! Database module
//!
//! This module handles database connections and operations behind the
//! [`WordPoolStore`] trait.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, run_migrations, health_check};
pub use memory::MemoryWordPool;
pub use repositories::{UserRepository, WordRepository, ProgressRepository, SessionRepository};
pub use service::DatabaseService;
pub use store::WordPoolStore;
