use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use super::{PriceQuote, PriceSource};
use crate::errors::{BotError, Result};

const TINKOFF_BASE_URL: &str = "https://invest-public-api.tinkoff.ru/rest";
const SERVICE_PREFIX: &str = "tinkoff.public.invest.api.contract.v1";

/// Tinkoff Invest client, the primary equity venue.
///
/// The REST surface mirrors the gRPC contract: instruments are looked up by
/// ticker over the shares list, then the depth-1 order book carries the
/// last traded price as a units/nano quotation.
pub struct TinkoffSource {
    client: Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SharesResponse {
    #[serde(default)]
    instruments: Vec<Share>,
}

#[derive(Debug, Deserialize)]
struct Share {
    ticker: String,
    figi: String,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    #[serde(rename = "lastPrice")]
    last_price: Option<Quotation>,
}

/// Fixed-point money value: integer units plus billionths of a unit.
#[derive(Debug, Deserialize)]
struct Quotation {
    units: String,
    #[serde(default)]
    nano: i64,
}

fn quotation_to_price(q: &Quotation) -> Result<f64> {
    let units: i64 = q
        .units
        .parse()
        .map_err(|e| BotError::upstream("Tinkoff", format!("bad units field: {}", e)))?;
    Ok(units as f64 + q.nano as f64 / 1e9)
}

impl TinkoffSource {
    pub fn new(timeout: Duration, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::config(format!("failed to build Tinkoff client: {}", e)))?;
        Ok(Self {
            client,
            token,
            base_url: TINKOFF_BASE_URL.to_string(),
        })
    }

    async fn call(&self, service: &str, method: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let url = format!("{}/{}.{}/{}", self.base_url, SERVICE_PREFIX, service, method);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BotError::upstream(self.name(), format!("status {}", response.status())).into());
        }
        Ok(response)
    }

    async fn find_figi(&self, ticker: &str) -> Result<String> {
        let response = self
            .call(
                "InstrumentsService",
                "Shares",
                json!({ "instrumentStatus": "INSTRUMENT_STATUS_BASE" }),
            )
            .await?;

        let shares: SharesResponse = response
            .json()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("invalid shares response: {}", e)))?;

        shares
            .instruments
            .into_iter()
            .find(|s| s.ticker.eq_ignore_ascii_case(ticker))
            .map(|s| s.figi)
            .ok_or_else(|| BotError::SymbolNotFound(ticker.to_string()).into())
    }

    async fn last_price(&self, ticker: &str) -> Result<f64> {
        let figi = self.find_figi(ticker).await?;

        let response = self
            .call(
                "MarketDataService",
                "GetOrderBook",
                json!({ "figi": figi, "depth": 1 }),
            )
            .await?;

        let order_book: OrderBookResponse = response
            .json()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("invalid order book response: {}", e)))?;

        let quotation = order_book
            .last_price
            .ok_or_else(|| BotError::SymbolNotFound(ticker.to_string()))?;

        quotation_to_price(&quotation)
    }
}

#[async_trait]
impl PriceSource for TinkoffSource {
    fn name(&self) -> &'static str {
        "Tinkoff"
    }

    async fn fetch(&self, symbol: &str) -> PriceQuote {
        match self.last_price(symbol).await {
            Ok(price) => PriceQuote::ok(symbol, price, self.name()),
            Err(e) => {
                warn!("Tinkoff lookup for {} failed: {}", symbol, e);
                PriceQuote::failed(symbol, self.name())
            }
        }
    }
}
