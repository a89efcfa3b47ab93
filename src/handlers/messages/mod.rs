//! Message handlers module
//!
//! Handles incoming text in private chats. Main-menu labels become menu
//! events, any other text is dialogue input.

use std::sync::Arc;

use teloxide::{types::Message, Bot};
use tracing::debug;

use crate::handlers::{dispatch_event, keyboards, user_ref};
use crate::i18n::I18n;
use crate::services::tutor::UserEvent;
use crate::services::TutorService;
use crate::utils::errors::{Result, WordBuddyError};

/// Handle incoming text messages
pub async fn handle_message(bot: Bot, msg: Message, tutor: Arc<TutorService>, i18n: Arc<I18n>) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| WordBuddyError::Validation("No user in message".to_string()))?;
    let user = user_ref(user);
    let chat_id = msg.chat.id;

    if !chat_id.is_user() {
        debug!(chat_id = ?chat_id, "Ignoring message outside a private chat");
        return Ok(());
    }

    let Some(text) = msg.text() else {
        debug!(user_id = user.id, "Ignoring non-text message");
        return Ok(());
    };

    let event = text_event(text, &i18n);
    debug!(user_id = user.id, event = ?event, "Processing message");
    dispatch_event(&bot, chat_id, &user, event, &tutor, &i18n, None).await
}

/// Menu event for a button label, dialogue input otherwise
pub fn text_event(text: &str, i18n: &I18n) -> UserEvent {
    keyboards::menu_event(text, i18n).unwrap_or_else(|| UserEvent::Text(text.to_string()))
}
