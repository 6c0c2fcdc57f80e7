mod binance;
mod bybit;
mod moex;
mod resolver;
mod tinkoff;

pub use binance::BinanceSource;
pub use bybit::BybitSource;
pub use moex::MoexSource;
pub use resolver::PriceResolver;
pub use tinkoff::TinkoffSource;

use async_trait::async_trait;

/// Outcome of a single price lookup against one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
    pub source_name: &'static str,
    pub success: bool,
}

impl PriceQuote {
    pub fn ok(symbol: impl Into<String>, price: f64, source_name: &'static str) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            source_name,
            success: true,
        }
    }

    pub fn failed(symbol: impl Into<String>, source_name: &'static str) -> Self {
        Self {
            symbol: symbol.into(),
            price: 0.0,
            source_name,
            success: false,
        }
    }

    /// A quote is usable only when the provider answered and the price is
    /// nonzero; a zero price still means "no data", never a market price.
    pub fn is_usable(&self) -> bool {
        self.success && self.price > 0.0
    }
}

/// One upstream market-data provider.
///
/// Implementations own their connection handling and never propagate
/// provider-specific errors: every failure is caught, logged, and turned
/// into a failure quote, so a broken venue can never unwind a batch pass.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, symbol: &str) -> PriceQuote;
}
