use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use crate::context::AppContext;
use crate::errors::Result;

use super::{
    commands::Command,
    handlers::{CallbackHandler, CommandHandler},
};

/// Main Telegram bot struct.
pub struct TelegramBot {
    bot: Bot,
    ctx: Arc<AppContext>,
}

impl TelegramBot {
    pub fn new(bot: Bot, ctx: Arc<AppContext>) -> Self {
        Self { bot, ctx }
    }

    /// Run the bot dispatcher until shutdown.
    pub async fn run(&self) -> Result<()> {
        info!("🤖 Starting Telegram dispatcher...");

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(Self::handle_command),
            )
            .branch(Update::filter_callback_query().endpoint(CallbackHandler::handle));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.ctx.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    /// Routes a parsed command to its handler.
    async fn handle_command(
        bot: Bot,
        msg: Message,
        cmd: Command,
        ctx: Arc<AppContext>,
    ) -> ResponseResult<()> {
        match cmd {
            Command::Start => CommandHandler::handle_start(bot, msg).await,
            Command::Help => CommandHandler::handle_help(bot, msg).await,
            Command::Register(args) => CommandHandler::handle_register(bot, msg, args, ctx).await,
            Command::Login(args) => CommandHandler::handle_login(bot, msg, args, ctx).await,
            Command::Logout => CommandHandler::handle_logout(bot, msg, ctx).await,
            Command::Stock(args) => CommandHandler::handle_stock(bot, msg, args, ctx).await,
            Command::Subscriptions => CommandHandler::handle_subscriptions(bot, msg).await,
            Command::Track(args) => CommandHandler::handle_track(bot, msg, args, ctx).await,
            Command::News(args) => CommandHandler::handle_news(bot, msg, args, ctx).await,
        }
    }
}
