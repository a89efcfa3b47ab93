//! Quiz module
//!
//! Question selection, answer options and feedback phrases.

pub mod engine;
pub mod feedback;

pub use engine::{AnswerOption, Evaluation, Question, QuizEngine};
pub use feedback::{FeedbackKind, FeedbackRotator};
