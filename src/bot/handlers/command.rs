use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tracing::error;

use crate::bot::Command;
use crate::context::AppContext;
use crate::engine::{LoginOutcome, RegisterOutcome, TrackOutcome};
use crate::errors::BotError;

/// Command handler for bot commands.
///
/// Handlers parse arguments, enforce the login gate, call into the core
/// services, and render their outcomes; no tracking or pricing semantics
/// live here.
pub struct CommandHandler;

/// Maps a core error to the message shown in chat. Upstream detail is
/// never surfaced to users.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<BotError>() {
        Some(BotError::ResolutionExhausted(_)) | Some(BotError::SymbolNotFound(_)) => {
            "⚠️ Could not retrieve the price, check the symbol.".to_string()
        }
        Some(BotError::Validation(message)) => format!("⚠️ {}", message),
        _ => "⚠️ Something went wrong, please try again later.".to_string(),
    }
}

impl CommandHandler {
    pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
        bot.send_message(
            msg.chat.id,
            "📈 Price tracker bot is ready!\n\
             Use /help for the command list.\n\
             To unlock tracking:\n\
             /register — create an account\n\
             /login — sign in",
        )
        .await?;
        Ok(())
    }

    pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
        bot.send_message(msg.chat.id, Command::descriptions().to_string())
            .await?;
        Ok(())
    }

    pub async fn handle_register(
        bot: Bot,
        msg: Message,
        args: String,
        ctx: Arc<AppContext>,
    ) -> ResponseResult<()> {
        let parts: Vec<&str> = args.split_whitespace().collect();
        if parts.len() != 2 {
            bot.send_message(msg.chat.id, "Usage: /register <email> <password>")
                .await?;
            return Ok(());
        }
        let (email, password) = (parts[0], parts[1]);

        let telegram_id = msg.chat.id.0;
        let reply = match ctx.accounts.register(telegram_id, email, password).await {
            Ok(RegisterOutcome::Created) => {
                "✅ Registration successful! You are now logged in.\nUse /help for the command list."
                    .to_string()
            }
            Ok(RegisterOutcome::EmailTaken) => "❌ That email is already registered.".to_string(),
            Err(e) => {
                error!("register failed for {}: {:#}", telegram_id, e);
                describe_error(&e)
            }
        };

        bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }

    pub async fn handle_login(
        bot: Bot,
        msg: Message,
        args: String,
        ctx: Arc<AppContext>,
    ) -> ResponseResult<()> {
        let parts: Vec<&str> = args.split_whitespace().collect();
        if parts.len() != 2 {
            bot.send_message(msg.chat.id, "Usage: /login <email> <password>")
                .await?;
            return Ok(());
        }
        let (email, password) = (parts[0], parts[1]);

        let telegram_id = msg.chat.id.0;
        let reply = match ctx.accounts.login(telegram_id, email, password).await {
            Ok(LoginOutcome::LoggedIn) => "🔓 You are logged in!".to_string(),
            Ok(LoginOutcome::BadCredentials) => "❌ Wrong email or password.".to_string(),
            Err(e) => {
                error!("login failed for {}: {:#}", telegram_id, e);
                describe_error(&e)
            }
        };

        bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }

    pub async fn handle_logout(bot: Bot, msg: Message, ctx: Arc<AppContext>) -> ResponseResult<()> {
        let telegram_id = msg.chat.id.0;
        if let Err(e) = ctx.accounts.logout(telegram_id).await {
            error!("logout failed for {}: {:#}", telegram_id, e);
        }
        bot.send_message(msg.chat.id, "🔒 You are logged out.").await?;
        Ok(())
    }

    pub async fn handle_stock(
        bot: Bot,
        msg: Message,
        args: String,
        ctx: Arc<AppContext>,
    ) -> ResponseResult<()> {
        let symbol = args.trim();
        if symbol.is_empty() {
            bot.send_message(
                msg.chat.id,
                "Usage examples:\n\
                 /stock BTCUSDT — crypto (Binance/Bybit)\n\
                 /stock SBER — equities (Tinkoff/MOEX)",
            )
            .await?;
            return Ok(());
        }

        let reply = match ctx.tracker.quote(symbol).await {
            Ok(text) => text,
            Err(e) => describe_error(&e),
        };

        bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }

    pub async fn handle_track(
        bot: Bot,
        msg: Message,
        args: String,
        ctx: Arc<AppContext>,
    ) -> ResponseResult<()> {
        let telegram_id = msg.chat.id.0;

        let mut parts = args.split_whitespace();
        let Some(symbol) = parts.next() else {
            bot.send_message(
                msg.chat.id,
                "Usage: /track <ticker> [threshold%]\n\
                 Example: /track BTCUSDT 5 — alert on 5% moves\n\
                 Use /track <ticker> remove to stop tracking",
            )
            .await?;
            return Ok(());
        };
        let arg = parts.next();

        let mut user = match ctx.accounts.authenticated(telegram_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                bot.send_message(msg.chat.id, "❌ Please /login to use tracking.")
                    .await?;
                return Ok(());
            }
            Err(e) => {
                error!("auth lookup failed for {}: {:#}", telegram_id, e);
                bot.send_message(msg.chat.id, describe_error(&e)).await?;
                return Ok(());
            }
        };
        let reply = match ctx.tracker.track(&mut user, symbol, arg).await {
            Ok(TrackOutcome::Added {
                symbol,
                price,
                threshold,
            }) => format!(
                "✅ Now tracking {}\n• Current price: {:.2}\n• Alert threshold: {}%",
                symbol, price, threshold
            ),
            Ok(TrackOutcome::Updated {
                symbol,
                price,
                threshold,
            }) => format!(
                "✅ Updated {}\n• Current price: {:.2}\n• Alert threshold: {}%",
                symbol, price, threshold
            ),
            Ok(TrackOutcome::Removed { symbol }) => format!("🗑 Stopped tracking {}", symbol),
            Ok(TrackOutcome::NotTracked { symbol }) => {
                format!("ℹ️ {} is not being tracked", symbol)
            }
            Err(e) => describe_error(&e),
        };

        bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }

    pub async fn handle_subscriptions(bot: Bot, msg: Message) -> ResponseResult<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("Crypto", "crypto")],
            vec![InlineKeyboardButton::callback("Stocks", "stocks")],
            vec![InlineKeyboardButton::callback("News", "news")],
        ]);

        bot.send_message(msg.chat.id, "🔔 Choose categories for the daily digest:")
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    pub async fn handle_news(
        bot: Bot,
        msg: Message,
        args: String,
        ctx: Arc<AppContext>,
    ) -> ResponseResult<()> {
        let query = args.trim();
        if query.is_empty() {
            bot.send_message(
                msg.chat.id,
                "Usage: /news <query>\nExample: /news Bitcoin",
            )
            .await?;
            return Ok(());
        }

        let telegram_id = msg.chat.id.0;
        let reply = match ctx.tracker.subscribe_news(telegram_id, query).await {
            Ok(true) => format!("📰 Subscribed to news for '{}'", query),
            Ok(false) => format!("ℹ️ You are already subscribed to news for '{}'", query),
            Err(e) => match e.downcast_ref::<BotError>() {
                Some(BotError::NotFound(_)) => "❌ Please /register or /login first.".to_string(),
                _ => describe_error(&e),
            },
        };

        bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }
}
