use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::{PriceQuote, PriceSource};
use crate::errors::{BotError, Result};

const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Spot ticker client for Binance, the primary crypto venue.
pub struct BinanceSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

impl BinanceSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::config(format!("failed to build Binance client: {}", e)))?;
        Ok(Self {
            client,
            base_url: BINANCE_BASE_URL.to_string(),
        })
    }

    async fn last_price(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("request failed: {}", e)))?;

        // Binance answers 400 for symbols it does not list.
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(BotError::SymbolNotFound(symbol.to_string()).into());
        }
        if !response.status().is_success() {
            return Err(BotError::upstream(self.name(), format!("status {}", response.status())).into());
        }

        let ticker: TickerPrice = response
            .json()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("invalid response: {}", e)))?;

        ticker
            .price
            .parse::<f64>()
            .map_err(|e| BotError::upstream(self.name(), format!("bad price field: {}", e)).into())
    }
}

#[async_trait]
impl PriceSource for BinanceSource {
    fn name(&self) -> &'static str {
        "Binance"
    }

    async fn fetch(&self, symbol: &str) -> PriceQuote {
        match self.last_price(symbol).await {
            Ok(price) => PriceQuote::ok(symbol, price, self.name()),
            Err(e) => {
                warn!("Binance lookup for {} failed: {}", symbol, e);
                PriceQuote::failed(symbol, self.name())
            }
        }
    }
}
