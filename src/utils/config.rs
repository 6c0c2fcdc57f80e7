use anyhow::Result;
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::errors::BotError;

const DEFAULT_ALERT_INTERVAL_MINUTES: u64 = 5;
const DEFAULT_MISFIRE_GRACE_SECONDS: u64 = 300;
const DEFAULT_THRESHOLD_PERCENT: f64 = 5.0;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_DIGEST_TIME: &str = "09:00";
const DEFAULT_DIGEST_TIMEZONE: &str = "Europe/Moscow";
const DEFAULT_CRYPTO_SUFFIXES: &str = "USDT,BTC,ETH";
const DEFAULT_CRYPTO_BENCHMARK: &str = "BTCUSDT";
const DEFAULT_STOCKS_BENCHMARK: &str = "SBER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // API Keys
    pub telegram_bot_token: String,
    pub tinkoff_token: String,

    // Alerting
    pub alert_interval_minutes: u64,
    pub default_threshold_percent: f64,

    // Daily digest
    pub digest_time: NaiveTime,
    pub digest_timezone: Tz,
    pub crypto_benchmark: String,
    pub stocks_benchmark: String,

    // Scheduling
    pub misfire_grace: Duration,

    // Price resolution
    pub crypto_suffixes: Vec<String>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Required API keys
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .map_err(|_| BotError::Config("TELEGRAM_BOT_TOKEN not set".into()))?,
            tinkoff_token: env::var("TINKOFF_TOKEN")
                .map_err(|_| BotError::Config("TINKOFF_TOKEN not set".into()))?,

            // Alerting
            alert_interval_minutes: env::var("ALERT_INTERVAL_MINUTES")
                .unwrap_or_else(|_| DEFAULT_ALERT_INTERVAL_MINUTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_ALERT_INTERVAL_MINUTES),
            default_threshold_percent: env::var("DEFAULT_THRESHOLD_PERCENT")
                .unwrap_or_else(|_| DEFAULT_THRESHOLD_PERCENT.to_string())
                .parse()
                .unwrap_or(DEFAULT_THRESHOLD_PERCENT),

            // Daily digest
            digest_time: Self::parse_digest_time(
                &env::var("DIGEST_TIME").unwrap_or_else(|_| DEFAULT_DIGEST_TIME.to_string()),
            )?,
            digest_timezone: env::var("DIGEST_TIMEZONE")
                .unwrap_or_else(|_| DEFAULT_DIGEST_TIMEZONE.to_string())
                .parse()
                .map_err(|e| BotError::Config(format!("invalid DIGEST_TIMEZONE: {}", e)))?,
            crypto_benchmark: env::var("CRYPTO_BENCHMARK")
                .unwrap_or_else(|_| DEFAULT_CRYPTO_BENCHMARK.to_string()),
            stocks_benchmark: env::var("STOCKS_BENCHMARK")
                .unwrap_or_else(|_| DEFAULT_STOCKS_BENCHMARK.to_string()),

            // Scheduling
            misfire_grace: Duration::from_secs(
                env::var("MISFIRE_GRACE_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_MISFIRE_GRACE_SECONDS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_MISFIRE_GRACE_SECONDS),
            ),

            // Price resolution
            crypto_suffixes: env::var("CRYPTO_SUFFIXES")
                .unwrap_or_else(|_| DEFAULT_CRYPTO_SUFFIXES.to_string())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECONDS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS),
            ),
        })
    }

    fn parse_digest_time(raw: &str) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map_err(|e| BotError::Config(format!("invalid DIGEST_TIME '{}': {}", raw, e)).into())
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram_bot_token.is_empty() {
            return Err(BotError::Config("Telegram bot token is required".into()).into());
        }

        if self.alert_interval_minutes == 0 {
            return Err(BotError::Config("Alert interval must be at least one minute".into()).into());
        }

        if self.default_threshold_percent <= 0.0 {
            return Err(BotError::Config("Default threshold must be positive".into()).into());
        }

        if self.crypto_suffixes.is_empty() {
            return Err(BotError::Config("At least one crypto suffix is required".into()).into());
        }

        if self.http_timeout.is_zero() {
            return Err(BotError::Config("HTTP timeout must be positive".into()).into());
        }

        Ok(())
    }
}
