use std::sync::Arc;
use tracing::{debug, warn};

use super::{PriceQuote, PriceSource};

/// Routes a symbol to the right provider chain and returns the first
/// usable quote.
///
/// Symbols ending in a crypto quote-currency suffix go to the crypto
/// chain, everything else to the equity chain. Within a chain the primary
/// venue is preferred for latency and coverage; later venues are degraded
/// but dependable fallbacks. Each venue call is fault-isolated, so one
/// broken venue never prevents trying the next.
pub struct PriceResolver {
    crypto_chain: Vec<Arc<dyn PriceSource>>,
    equity_chain: Vec<Arc<dyn PriceSource>>,
    crypto_suffixes: Vec<String>,
}

impl PriceResolver {
    pub fn new(
        crypto_chain: Vec<Arc<dyn PriceSource>>,
        equity_chain: Vec<Arc<dyn PriceSource>>,
        crypto_suffixes: Vec<String>,
    ) -> Self {
        Self {
            crypto_chain,
            equity_chain,
            crypto_suffixes,
        }
    }

    pub fn is_crypto(&self, symbol: &str) -> bool {
        self.crypto_suffixes
            .iter()
            .any(|suffix| symbol.ends_with(suffix.as_str()))
    }

    /// Resolves one symbol; exhaustion of the chain yields a failure quote
    /// that callers must treat as "cannot alert or display this tick".
    pub async fn resolve(&self, symbol: &str) -> PriceQuote {
        let chain = if self.is_crypto(symbol) {
            &self.crypto_chain
        } else {
            &self.equity_chain
        };

        for source in chain {
            let quote = source.fetch(symbol).await;
            if quote.is_usable() {
                return quote;
            }
            debug!(
                "{} could not resolve {}, trying next venue",
                source.name(),
                symbol
            );
        }

        warn!("all venues exhausted for {}", symbol);
        PriceQuote::failed(symbol, "unresolved")
    }
}
