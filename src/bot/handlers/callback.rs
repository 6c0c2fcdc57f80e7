use std::sync::Arc;
use teloxide::prelude::*;
use tracing::error;

use crate::context::AppContext;
use crate::db::models::Category;
use crate::errors::BotError;

/// Handles inline-keyboard callbacks from the subscription menu.
pub struct CallbackHandler;

impl CallbackHandler {
    pub async fn handle(bot: Bot, q: CallbackQuery, ctx: Arc<AppContext>) -> ResponseResult<()> {
        bot.answer_callback_query(q.id.clone()).await?;

        let Some(category) = q.data.as_deref().and_then(|d| d.parse::<Category>().ok()) else {
            return Ok(());
        };

        let chat_id = ChatId(q.from.id.0 as i64);
        let telegram_id = chat_id.0;

        let reply = match ctx.tracker.toggle_subscription(telegram_id, category).await {
            Ok(enabled) => format!(
                "Subscription '{}' {}.",
                category,
                if enabled { "enabled" } else { "disabled" }
            ),
            Err(e) => match e.downcast_ref::<BotError>() {
                Some(BotError::NotFound(_)) => "❌ Please /register or /login first.".to_string(),
                _ => {
                    error!("subscription toggle failed for {}: {:#}", telegram_id, e);
                    "⚠️ Something went wrong, please try again later.".to_string()
                }
            },
        };

        bot.send_message(chat_id, reply).await?;
        Ok(())
    }
}
