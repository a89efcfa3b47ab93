//! Test helpers module
//!
//! Utilities shared by the integration tests: in-memory collaborators,
//! a ready-made tutor context and a mock Telegram API server.

#![allow(dead_code)]

pub mod mocks;
pub mod telegram_mock;
pub mod test_context;
pub mod test_data;

pub use mocks::*;
pub use telegram_mock::*;
pub use test_context::*;
pub use test_data::*;
