//! Start command handler
//!
//! Greets the user, registers them on first contact and shows the main menu.
//! A running quiz or dialogue is left as it is.

use std::sync::Arc;

use teloxide::{types::ChatId, Bot};
use tracing::info;

use crate::handlers::dispatch_event;
use crate::i18n::I18n;
use crate::services::tutor::{UserEvent, UserRef};
use crate::services::TutorService;
use crate::utils::errors::Result;

/// Handle /start command
pub async fn handle_start(
    bot: Bot,
    chat_id: ChatId,
    user: UserRef,
    tutor: Arc<TutorService>,
    i18n: Arc<I18n>,
) -> Result<()> {
    info!(user_id = user.id, "User started bot");
    dispatch_event(&bot, chat_id, &user, UserEvent::Start, &tutor, &i18n, None).await
}
