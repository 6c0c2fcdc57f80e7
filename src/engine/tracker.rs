use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::db::models::{Category, NewsSubscription, TrackedTicker, User};
use crate::db::UserRepository;
use crate::errors::{BotError, Result};
use crate::sources::{PriceResolver, PriceSource};
use crate::utils::{format_price, Validator};

/// The literal threshold argument that deletes a ticker instead of
/// updating it.
const REMOVE_TOKEN: &str = "remove";

/// User-facing tracking, quoting, and subscription operations, called by
/// the transport layer.
pub struct TrackerService {
    db: Arc<dyn UserRepository>,
    resolver: Arc<PriceResolver>,
    crypto_venues: Vec<Arc<dyn PriceSource>>,
    equity_venues: Vec<Arc<dyn PriceSource>>,
    default_threshold: f64,
}

/// Result of a `/track` invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    Added {
        symbol: String,
        price: f64,
        threshold: f64,
    },
    Updated {
        symbol: String,
        price: f64,
        threshold: f64,
    },
    Removed {
        symbol: String,
    },
    /// Removal requested for a symbol that was never tracked; a no-op.
    NotTracked {
        symbol: String,
    },
}

impl TrackerService {
    pub fn new(
        db: Arc<dyn UserRepository>,
        resolver: Arc<PriceResolver>,
        crypto_venues: Vec<Arc<dyn PriceSource>>,
        equity_venues: Vec<Arc<dyn PriceSource>>,
        default_threshold: f64,
    ) -> Self {
        Self {
            db,
            resolver,
            crypto_venues,
            equity_venues,
            default_threshold,
        }
    }

    /// Adds, updates, or removes a tracked ticker on the given user.
    ///
    /// `arg` is the optional second command argument: a threshold
    /// percentage, or the literal `remove`. New and updated entries are
    /// seeded with the currently resolved price so the next alert pass
    /// compares against the moment of tracking.
    pub async fn track(&self, user: &mut User, raw_symbol: &str, arg: Option<&str>) -> Result<TrackOutcome> {
        let symbol = Validator::normalize_symbol(raw_symbol)?;

        if let Some(arg) = arg {
            if arg.eq_ignore_ascii_case(REMOVE_TOKEN) {
                if user.remove_ticker(&symbol) {
                    self.db.save_user(user).await?;
                    info!("user {} stopped tracking {}", user.telegram_id, symbol);
                    return Ok(TrackOutcome::Removed { symbol });
                }
                return Ok(TrackOutcome::NotTracked { symbol });
            }
        }

        let threshold = match arg {
            Some(raw) => Validator::parse_threshold(raw)?,
            None => self.default_threshold,
        };

        let quote = self.resolver.resolve(&symbol).await;
        if !quote.is_usable() {
            return Err(BotError::ResolutionExhausted(symbol).into());
        }
        let price = quote.price;
        let now = Utc::now();

        let existing = user
            .tracked_tickers
            .iter()
            .position(|t| t.symbol == symbol);
        let outcome = match existing {
            Some(index) => {
                let ticker = &mut user.tracked_tickers[index];
                ticker.threshold_percent = threshold;
                ticker.last_price = Some(price);
                ticker.updated_at = Some(now);
                TrackOutcome::Updated {
                    symbol: symbol.clone(),
                    price,
                    threshold,
                }
            }
            None => {
                user.tracked_tickers
                    .push(TrackedTicker::new(symbol.clone(), threshold, Some(price)));
                TrackOutcome::Added {
                    symbol: symbol.clone(),
                    price,
                    threshold,
                }
            }
        };

        self.db.save_user(user).await?;
        info!(
            "user {} tracking {} at threshold {}%",
            user.telegram_id, symbol, threshold
        );
        Ok(outcome)
    }

    /// Read-only per-venue quote display; never touches ticker state.
    pub async fn quote(&self, raw_symbol: &str) -> Result<String> {
        let symbol = Validator::normalize_symbol(raw_symbol)?;
        let is_crypto = self.resolver.is_crypto(&symbol);
        let venues = if is_crypto {
            &self.crypto_venues
        } else {
            &self.equity_venues
        };

        let mut lines = vec![format!("📊 {}", symbol)];
        let mut any_usable = false;

        for venue in venues {
            let quote = venue.fetch(&symbol).await;
            if quote.is_usable() {
                any_usable = true;
                let price = format_price(quote.price);
                lines.push(if is_crypto {
                    format!("• {}: ${}", venue.name(), price)
                } else {
                    format!("• {}: {} RUB", venue.name(), price)
                });
            } else {
                lines.push(format!("• {}: unavailable", venue.name()));
            }
        }

        if !any_usable {
            return Err(BotError::ResolutionExhausted(symbol).into());
        }

        Ok(lines.join("\n"))
    }

    /// Flips one digest category for the user and returns the new state.
    pub async fn toggle_subscription(&self, telegram_id: i64, category: Category) -> Result<bool> {
        let mut user = self
            .db
            .find_user_by_telegram_id(telegram_id)
            .await?
            .ok_or_else(|| BotError::not_found(format!("no user for telegram id {}", telegram_id)))?;

        let enabled = user.subscriptions.toggle(category);
        self.db.save_user(&user).await?;
        info!(
            "user {} subscription '{}' now {}",
            telegram_id,
            category,
            if enabled { "on" } else { "off" }
        );
        Ok(enabled)
    }

    /// Adds a news keyword subscription; returns false when the query is
    /// already present.
    pub async fn subscribe_news(&self, telegram_id: i64, query: &str) -> Result<bool> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BotError::validation("news query is empty").into());
        }

        let user = self
            .db
            .find_user_by_telegram_id(telegram_id)
            .await?
            .ok_or_else(|| BotError::not_found(format!("no user for telegram id {}", telegram_id)))?;

        self.db
            .add_news_subscription(NewsSubscription {
                user_id: user.id,
                query: query.to_string(),
            })
            .await
    }
}
