use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::{PriceQuote, PriceSource};
use crate::errors::{BotError, Result};

const BYBIT_BASE_URL: &str = "https://api.bybit.com";

/// Spot ticker client for Bybit, the secondary crypto venue.
///
/// Bybit is queried for quote display only; it is not part of the
/// resolution fallback chain.
pub struct BybitSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    #[serde(default)]
    result: TickersResult,
}

#[derive(Debug, Default, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    #[serde(rename = "lastPrice")]
    last_price: String,
}

impl BybitSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::config(format!("failed to build Bybit client: {}", e)))?;
        Ok(Self {
            client,
            base_url: BYBIT_BASE_URL.to_string(),
        })
    }

    async fn last_price(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/v5/market/tickers", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("category", "spot"), ("symbol", symbol)])
            .send()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BotError::upstream(self.name(), format!("status {}", response.status())).into());
        }

        let body: TickersResponse = response
            .json()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("invalid response: {}", e)))?;

        if body.ret_code != 0 {
            return Err(BotError::upstream(
                self.name(),
                format!("retCode {}: {}", body.ret_code, body.ret_msg),
            )
            .into());
        }

        let entry = body
            .result
            .list
            .first()
            .ok_or_else(|| BotError::SymbolNotFound(symbol.to_string()))?;

        entry
            .last_price
            .parse::<f64>()
            .map_err(|e| BotError::upstream(self.name(), format!("bad lastPrice field: {}", e)).into())
    }
}

#[async_trait]
impl PriceSource for BybitSource {
    fn name(&self) -> &'static str {
        "Bybit"
    }

    async fn fetch(&self, symbol: &str) -> PriceQuote {
        match self.last_price(symbol).await {
            Ok(price) => PriceQuote::ok(symbol, price, self.name()),
            Err(e) => {
                warn!("Bybit lookup for {} failed: {}", symbol, e);
                PriceQuote::failed(symbol, self.name())
            }
        }
    }
}
