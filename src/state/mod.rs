//! State management module
//!
//! This module handles quiz sessions, the add/delete dialogues and the
//! storage of dialogue context between updates.

pub mod context;
pub mod flow;
pub mod session;
pub mod storage;

// Re-export commonly used state components
pub use context::{ConversationContext, ConversationState};
pub use flow::{ConversationFlow, FlowEvent, FlowOutcome, Rejection};
pub use session::{EndReason, ExpiryNotifier, SessionController, SessionSummary};
pub use storage::{ConversationStore, MemoryStateStorage, StateStorage};
