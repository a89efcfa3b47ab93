//! Bot handlers module
//!
//! This module contains all Telegram bot handlers organized by type:
//! - Command handlers for bot commands
//! - Callback handlers for inline keyboard interactions
//! - Message handlers for text messages and menu buttons
//!
//! Handlers translate updates into [`UserEvent`]s for the tutor and send its
//! [`Reply`]s back through the bot.

pub mod callbacks;
pub mod commands;
pub mod keyboards;
pub mod messages;

// Re-export commonly used handler functions
pub use callbacks::handle_callback_query;
pub use commands::{handle_command, Command};
pub use messages::handle_message;

use teloxide::types::{CallbackQuery, ChatId, InputFile, MessageId};
use teloxide::{prelude::*, Bot};
use tracing::{debug, warn};

use crate::i18n::I18n;
use crate::services::tutor::{Reply, UserEvent, UserRef};
use crate::services::TutorService;
use crate::utils::errors::Result;

/// Tutor-facing view of a Telegram user
pub fn user_ref(user: &teloxide::types::User) -> UserRef {
    UserRef {
        id: user.id.0 as i64,
        first_name: Some(user.first_name.clone()),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
    }
}

/// Run one event through the tutor and send the replies
pub async fn dispatch_event(
    bot: &Bot,
    chat_id: ChatId,
    user: &UserRef,
    event: UserEvent,
    tutor: &TutorService,
    i18n: &I18n,
    query: Option<&CallbackQuery>,
) -> Result<()> {
    let replies = tutor.handle(user, event).await;
    let lang = i18n.detect_user_language(user.language_code.as_deref());
    deliver(bot, chat_id, replies, i18n, &lang, query).await
}

/// Send replies in order. Inside a callback the first toast answers the query
/// and option edits apply to the message carrying the pressed button.
pub async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    replies: Vec<Reply>,
    i18n: &I18n,
    lang: &str,
    query: Option<&CallbackQuery>,
) -> Result<()> {
    let mut query_answered = false;
    let source_message: Option<MessageId> = query.and_then(|q| q.message.as_ref()).map(|m| m.id());

    for reply in replies {
        match reply {
            Reply::Text { text, keyboard } => {
                let request = bot.send_message(chat_id, text);
                match keyboards::render(keyboard, i18n, lang) {
                    Some(markup) => request.reply_markup(markup).await?,
                    None => request.await?,
                };
            }
            Reply::Question { text, options } => {
                bot.send_message(chat_id, text)
                    .reply_markup(keyboards::answer_keyboard(&options, i18n, lang))
                    .await?;
            }
            Reply::EditOptions { options } => match source_message {
                Some(message_id) => {
                    bot.edit_message_reply_markup(chat_id, message_id)
                        .reply_markup(keyboards::answer_keyboard(&options, i18n, lang))
                        .await?;
                }
                None => debug!(chat_id = ?chat_id, "No message to edit, options dropped"),
            },
            Reply::Toast { text } => match query {
                Some(query) if !query_answered => {
                    bot.answer_callback_query(query.id.clone()).text(text).await?;
                    query_answered = true;
                }
                _ => {
                    bot.send_message(chat_id, text).await?;
                }
            },
            Reply::Voice { audio } => {
                bot.send_voice(chat_id, InputFile::memory(audio).file_name("word.ogg")).await?;
            }
        }
    }

    if let Some(query) = query.filter(|_| !query_answered) {
        if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
            warn!(error = %e, "Failed to answer callback query");
        }
    }

    Ok(())
}
