use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::EnvFilter;

use price_tracker_bot::bot::TelegramBot;
use price_tracker_bot::context::AppContext;
use price_tracker_bot::db::{MemoryDatabase, UserRepository};
use price_tracker_bot::engine::{AccountService, AlertEngine, DigestEngine, TrackerService};
use price_tracker_bot::errors::Result;
use price_tracker_bot::notify::{Notifier, TelegramNotifier};
use price_tracker_bot::scheduler::{JobRunner, Trigger};
use price_tracker_bot::sources::{
    BinanceSource, BybitSource, MoexSource, PriceResolver, PriceSource, TinkoffSource,
};
use price_tracker_bot::utils::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(Config::from_env()?);
    config.validate()?;

    let db: Arc<dyn UserRepository> = Arc::new(MemoryDatabase::new());

    // Venue adapters; resolution order inside each chain matters.
    let binance: Arc<dyn PriceSource> = Arc::new(BinanceSource::new(config.http_timeout)?);
    let bybit: Arc<dyn PriceSource> = Arc::new(BybitSource::new(config.http_timeout)?);
    let tinkoff: Arc<dyn PriceSource> =
        Arc::new(TinkoffSource::new(config.http_timeout, config.tinkoff_token.clone())?);
    let moex: Arc<dyn PriceSource> = Arc::new(MoexSource::new(config.http_timeout)?);

    let resolver = Arc::new(PriceResolver::new(
        vec![binance.clone()],
        vec![tinkoff.clone(), moex.clone()],
        config.crypto_suffixes.clone(),
    ));

    let bot = Bot::new(&config.telegram_bot_token);
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));

    let accounts = Arc::new(AccountService::new(db.clone()));
    let tracker = Arc::new(TrackerService::new(
        db.clone(),
        resolver.clone(),
        vec![binance.clone(), bybit.clone()],
        vec![tinkoff.clone(), moex.clone()],
        config.default_threshold_percent,
    ));
    let alert_engine = Arc::new(AlertEngine::new(resolver.clone(), db.clone(), notifier.clone()));
    let digest_engine = Arc::new(DigestEngine::new(
        db.clone(),
        notifier.clone(),
        binance.clone(),
        moex.clone(),
        config.crypto_benchmark.clone(),
        config.stocks_benchmark.clone(),
    ));

    let ctx = Arc::new(AppContext {
        config: config.clone(),
        db,
        notifier,
        resolver,
        accounts,
        tracker,
        alert_engine,
        digest_engine,
    });

    let mut runner = JobRunner::new(ctx.clone());
    runner.register(
        "price_alerts",
        Trigger::Interval(Duration::from_secs(config.alert_interval_minutes * 60)),
        config.misfire_grace,
        |ctx| async move { ctx.alert_engine.run_once().await },
    );
    runner.register(
        "daily_digest",
        Trigger::Daily {
            time: config.digest_time,
            tz: config.digest_timezone,
        },
        config.misfire_grace,
        |ctx| async move { ctx.digest_engine.run_once().await },
    );
    let _jobs = runner.start();

    info!("📈 price-tracker-bot is up");
    TelegramBot::new(bot, ctx).run().await
}
