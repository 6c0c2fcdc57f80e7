use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::models::User;
use crate::db::UserRepository;
use crate::errors::Result;
use crate::notify::Notifier;
use crate::sources::PriceSource;
use crate::utils::format_price;

/// Composes the once-daily category summary for subscribed users.
///
/// Each category resolves one benchmark instrument through its dedicated
/// venue (not the generic resolver): crypto through the primary crypto
/// venue, stocks through the equity fallback venue.
pub struct DigestEngine {
    db: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    crypto_source: Arc<dyn PriceSource>,
    equity_source: Arc<dyn PriceSource>,
    crypto_benchmark: String,
    stocks_benchmark: String,
}

impl DigestEngine {
    pub fn new(
        db: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        crypto_source: Arc<dyn PriceSource>,
        equity_source: Arc<dyn PriceSource>,
        crypto_benchmark: String,
        stocks_benchmark: String,
    ) -> Self {
        Self {
            db,
            notifier,
            crypto_source,
            equity_source,
            crypto_benchmark,
            stocks_benchmark,
        }
    }

    /// Runs one digest pass over all users with an enabled category.
    pub async fn run_once(&self) -> Result<()> {
        let users = self.db.find_users_with_any_subscription().await?;
        info!("📰 Digest pass over {} user(s)", users.len());

        for user in users {
            if let Err(e) = self.send_digest(&user).await {
                error!("digest failed for user {}: {:#}", user.telegram_id, e);
            }
        }

        Ok(())
    }

    async fn send_digest(&self, user: &User) -> Result<()> {
        let mut lines = Vec::new();

        if user.subscriptions.crypto {
            let quote = self.crypto_source.fetch(&self.crypto_benchmark).await;
            if quote.is_usable() {
                lines.push(format!("₿ {}: ${}", self.crypto_benchmark, format_price(quote.price)));
            } else {
                warn!("digest: crypto benchmark {} unresolved", self.crypto_benchmark);
            }
        }

        if user.subscriptions.stocks {
            let quote = self.equity_source.fetch(&self.stocks_benchmark).await;
            if quote.is_usable() {
                lines.push(format!("🏦 {}: {} RUB", self.stocks_benchmark, format_price(quote.price)));
            } else {
                warn!("digest: stocks benchmark {} unresolved", self.stocks_benchmark);
            }
        }

        // The news category has no representative instrument, so it never
        // contributes a line. No lines means no message for this user.
        if lines.is_empty() {
            return Ok(());
        }

        let text = format!("📰 Daily digest:\n{}", lines.join("\n"));
        if let Err(e) = self.notifier.send_message(user.telegram_id, &text).await {
            warn!("failed to deliver digest to {}: {:#}", user.telegram_id, e);
        }

        Ok(())
    }
}
