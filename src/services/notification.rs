//! Notification service implementation
//!
//! Delivers messages that are not a reply to an incoming update, currently the
//! notice sent when a quiz session expires from inactivity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::{prelude::*, types::ChatId, Bot};
use tracing::{error, info};

use crate::handlers::keyboards;
use crate::i18n::I18n;
use crate::services::tutor::session_summary_text;
use crate::state::session::{ExpiryNotifier, SessionSummary};
use crate::utils::errors::Result;

/// Notification counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationStats {
    pub total_sent: u64,
    pub total_failed: u64,
}

/// Sends unsolicited messages through the bot
pub struct NotificationService {
    bot: Bot,
    i18n: Arc<I18n>,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl NotificationService {
    pub fn new(bot: Bot, i18n: Arc<I18n>) -> Self {
        Self {
            bot,
            i18n,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Send a text with the main menu attached. Private chat ids equal user ids.
    pub async fn send_with_menu(&self, user_id: i64, text: String) -> Result<()> {
        let lang = self.i18n.default_language().to_string();
        let result = self
            .bot
            .send_message(ChatId(user_id), text)
            .reply_markup(keyboards::main_menu(&self.i18n, &lang))
            .await;

        match result {
            Ok(_) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                Err(e.into())
            }
        }
    }

    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            total_sent: self.sent.load(Ordering::Relaxed),
            total_failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl ExpiryNotifier for NotificationService {
    async fn session_expired(&self, summary: &SessionSummary) {
        let text = session_summary_text(&self.i18n, summary, self.i18n.default_language());

        match self.send_with_menu(summary.user_id, text).await {
            Ok(()) => info!(user_id = summary.user_id, "Session expiry notice sent"),
            Err(e) => error!(user_id = summary.user_id, error = %e, "Failed to send session expiry notice"),
        }
    }
}
