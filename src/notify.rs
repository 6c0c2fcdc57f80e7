use async_trait::async_trait;
use teloxide::prelude::*;

use crate::errors::Result;

/// Outbound notification sink.
///
/// Delivery is fire-and-forget: callers log a failed send and never let it
/// reach ticker or subscription state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Production notifier backed by the Telegram bot API.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}
