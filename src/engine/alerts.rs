use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::db::models::{TrackedTicker, User};
use crate::db::UserRepository;
use crate::errors::Result;
use crate::notify::Notifier;
use crate::sources::PriceResolver;
use crate::utils::{format_percent, format_price};

/// Detects threshold crossings across every tracked ticker.
///
/// One pass per scheduler tick: each user's tickers are checked against
/// freshly resolved prices, fired alerts are batched into a single message
/// per user, and the refreshed ticker states are persisted once per user.
pub struct AlertEngine {
    resolver: Arc<PriceResolver>,
    db: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
}

/// Outcome of a single ticker check within a pass.
#[derive(Debug)]
enum TickOutcome {
    /// Price could not be resolved; ticker state untouched.
    Unresolved,
    /// First observation: baseline recorded, no alert possible yet.
    Baseline(f64),
    /// Regular observation compared against the previous one.
    Observed {
        previous: f64,
        current: f64,
        change_percent: f64,
        fired: bool,
    },
}

impl AlertEngine {
    pub fn new(
        resolver: Arc<PriceResolver>,
        db: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resolver,
            db,
            notifier,
        }
    }

    /// Runs one alert pass over all users with tracked tickers.
    ///
    /// Per-user failures are contained here; a broken user record or a
    /// failed store write never unwinds the rest of the pass.
    pub async fn run_once(&self) -> Result<()> {
        let users = self.db.find_users_with_tracked_tickers().await?;
        info!("🔔 Alert pass over {} user(s)", users.len());

        for mut user in users {
            if let Err(e) = self.process_user(&mut user).await {
                error!("alert pass failed for user {}: {:#}", user.telegram_id, e);
            }
        }

        Ok(())
    }

    async fn process_user(&self, user: &mut User) -> Result<()> {
        let mut alerts = Vec::new();
        let mut dirty = false;

        for ticker in user.tracked_tickers.iter_mut() {
            match self.check_ticker(ticker).await {
                TickOutcome::Unresolved => {
                    debug!("skipping {} this tick: price unresolved", ticker.symbol);
                }
                TickOutcome::Baseline(price) => {
                    debug!("{}: recorded baseline {:.2}", ticker.symbol, price);
                    dirty = true;
                }
                TickOutcome::Observed {
                    previous,
                    current,
                    change_percent,
                    fired,
                } => {
                    dirty = true;
                    if fired {
                        alerts.push(format!(
                            "🚨 {}: {} ({} → {})",
                            ticker.symbol,
                            format_percent(change_percent),
                            format_price(previous),
                            format_price(current)
                        ));
                    }
                }
            }
        }

        if !alerts.is_empty() {
            let text = format!("🔔 Threshold alerts:\n{}", alerts.join("\n"));
            if let Err(e) = self.notifier.send_message(user.telegram_id, &text).await {
                warn!("failed to deliver alerts to {}: {:#}", user.telegram_id, e);
            }
        }

        if dirty {
            self.db.save_user(user).await?;
        }

        Ok(())
    }

    /// One step of the per-ticker state machine.
    ///
    /// The comparison is always against the immediately preceding
    /// observation: `last_price` rolls forward on every successful
    /// resolution, whether or not an alert fired.
    async fn check_ticker(&self, ticker: &mut TrackedTicker) -> TickOutcome {
        let quote = self.resolver.resolve(&ticker.symbol).await;
        if !quote.is_usable() {
            return TickOutcome::Unresolved;
        }

        let current = quote.price;
        let now = Utc::now();

        match ticker.last_price {
            None => {
                ticker.last_price = Some(current);
                ticker.updated_at = Some(now);
                TickOutcome::Baseline(current)
            }
            Some(previous) => {
                let change_percent = ((current - previous) / previous * 100.0).abs();
                ticker.last_price = Some(current);
                ticker.updated_at = Some(now);
                TickOutcome::Observed {
                    previous,
                    current,
                    change_percent,
                    fired: change_percent >= ticker.threshold_percent,
                }
            }
        }
    }
}
