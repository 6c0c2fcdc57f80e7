use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use super::{PriceQuote, PriceSource};
use crate::errors::{BotError, Result};

const MOEX_BASE_URL: &str = "https://iss.moex.com";

/// MOEX ISS client, the always-available equity fallback venue.
pub struct MoexSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IssResponse {
    marketdata: Option<MarketData>,
}

/// ISS tabular block: a column-name header plus rows of mixed JSON values.
#[derive(Debug, Deserialize)]
struct MarketData {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

/// Picks the first board row carrying a non-null LAST price.
fn extract_last_price(marketdata: &MarketData) -> Option<f64> {
    let last_idx = marketdata.columns.iter().position(|c| c == "LAST")?;
    marketdata
        .data
        .iter()
        .find_map(|row| row.get(last_idx).and_then(Value::as_f64))
}

impl MoexSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::config(format!("failed to build MOEX client: {}", e)))?;
        Ok(Self {
            client,
            base_url: MOEX_BASE_URL.to_string(),
        })
    }

    async fn last_price(&self, ticker: &str) -> Result<f64> {
        let url = format!(
            "{}/iss/engines/stock/markets/shares/securities/{}.json",
            self.base_url, ticker
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BotError::upstream(self.name(), format!("status {}", response.status())).into());
        }

        let body: IssResponse = response
            .json()
            .await
            .map_err(|e| BotError::upstream(self.name(), format!("invalid response: {}", e)))?;

        let marketdata = body
            .marketdata
            .ok_or_else(|| BotError::SymbolNotFound(ticker.to_string()))?;

        extract_last_price(&marketdata)
            .ok_or_else(|| BotError::SymbolNotFound(ticker.to_string()).into())
    }
}

#[async_trait]
impl PriceSource for MoexSource {
    fn name(&self) -> &'static str {
        "MOEX"
    }

    async fn fetch(&self, symbol: &str) -> PriceQuote {
        match self.last_price(symbol).await {
            Ok(price) => PriceQuote::ok(symbol, price, self.name()),
            Err(e) => {
                warn!("MOEX lookup for {} failed: {}", symbol, e);
                PriceQuote::failed(symbol, self.name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn marketdata(value: Value) -> MarketData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_last_price_by_column_name() {
        let md = marketdata(json!({
            "columns": ["SECID", "BOARDID", "LAST"],
            "data": [["SBER", "TQBR", 285.5]]
        }));
        assert_eq!(extract_last_price(&md), Some(285.5));
    }

    #[test]
    fn skips_boards_without_a_last_price() {
        let md = marketdata(json!({
            "columns": ["SECID", "LAST"],
            "data": [["SBER", null], ["SBER", 285.5]]
        }));
        assert_eq!(extract_last_price(&md), Some(285.5));
    }

    #[test]
    fn missing_column_or_data_yields_none() {
        let no_column = marketdata(json!({
            "columns": ["SECID", "BID"],
            "data": [["SBER", 285.0]]
        }));
        assert_eq!(extract_last_price(&no_column), None);

        let no_rows = marketdata(json!({
            "columns": ["SECID", "LAST"],
            "data": []
        }));
        assert_eq!(extract_last_price(&no_rows), None);
    }
}
