//! Help command handler

use std::sync::Arc;

use teloxide::{types::ChatId, Bot};

use crate::handlers::dispatch_event;
use crate::i18n::I18n;
use crate::services::tutor::{UserEvent, UserRef};
use crate::services::TutorService;
use crate::utils::errors::Result;

/// Handle /help command
pub async fn handle_help(
    bot: Bot,
    chat_id: ChatId,
    user: UserRef,
    tutor: Arc<TutorService>,
    i18n: Arc<I18n>,
) -> Result<()> {
    dispatch_event(&bot, chat_id, &user, UserEvent::Help, &tutor, &i18n, None).await
}
