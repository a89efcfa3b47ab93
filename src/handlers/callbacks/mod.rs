//! Callback query handlers module
//!
//! Handles inline keyboard button presses: quiz answers, pronunciation,
//! reset confirmation, dialogue choices and stats actions.

use std::sync::Arc;

use teloxide::{prelude::*, types::{CallbackQuery, ChatId}, Bot};
use tracing::{debug, warn};

use crate::handlers::{dispatch_event, keyboards, user_ref};
use crate::i18n::I18n;
use crate::services::TutorService;
use crate::utils::errors::Result;

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    tutor: Arc<TutorService>,
    i18n: Arc<I18n>,
) -> Result<()> {
    let user = user_ref(&query.from);
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user.id));

    let Some(data) = query.data.as_deref() else {
        bot.answer_callback_query(query.id.clone()).await?;
        return Ok(());
    };
    debug!(user_id = user.id, callback_data = %data, "Processing callback query");

    match keyboards::parse_callback(data) {
        Some(event) => dispatch_event(&bot, chat_id, &user, event, &tutor, &i18n, Some(&query)).await,
        None => {
            warn!(user_id = user.id, callback_data = %data, "Unknown callback data");
            bot.answer_callback_query(query.id.clone()).await?;
            Ok(())
        }
    }
}
