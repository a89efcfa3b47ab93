//! Command handlers module
//!
//! This module contains handlers for the bot commands like /start, /help, etc.

pub mod help;
pub mod start;

use std::sync::Arc;

use teloxide::{types::Message, utils::command::BotCommands, Bot};
use tracing::debug;

use crate::handlers::{dispatch_event, user_ref};
use crate::i18n::I18n;
use crate::services::tutor::UserEvent;
use crate::services::TutorService;
use crate::utils::errors::{Result, WordBuddyError};

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "WordBuddy commands:")]
pub enum Command {
    #[command(description = "Start the bot and show the main menu")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Start a quiz")]
    Quiz,
    #[command(description = "List your words")]
    Words,
    #[command(description = "Show your statistics")]
    Stats,
    #[command(description = "Leave the current activity")]
    Cancel,
}

impl Command {
    pub fn event(&self) -> UserEvent {
        match self {
            Command::Start => UserEvent::Start,
            Command::Help => UserEvent::Help,
            Command::Quiz => UserEvent::StartQuiz,
            Command::Words => UserEvent::ListWords,
            Command::Stats => UserEvent::ShowStats,
            Command::Cancel => UserEvent::ReturnToMain,
        }
    }
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    tutor: Arc<TutorService>,
    i18n: Arc<I18n>,
) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| WordBuddyError::Validation("No user in message".to_string()))?;
    let user = user_ref(user);

    debug!(user_id = user.id, command = ?cmd, "Processing command");

    if !msg.chat.id.is_user() {
        return Ok(());
    }

    match cmd {
        Command::Start => start::handle_start(bot, msg.chat.id, user, tutor, i18n).await,
        Command::Help => help::handle_help(bot, msg.chat.id, user, tutor, i18n).await,
        other => dispatch_event(&bot, msg.chat.id, &user, other.event(), &tutor, &i18n, None).await,
    }
}
