use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single symbol a user watches for threshold crossings.
///
/// `last_price` is absent only between the first add and the first recorded
/// observation; once set it is only ever replaced by a successful
/// resolution, never cleared. `added_at` is immutable after creation,
/// `updated_at` moves on every successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTicker {
    pub symbol: String,
    pub threshold_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    pub added_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TrackedTicker {
    pub fn new(symbol: impl Into<String>, threshold_percent: f64, last_price: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            threshold_percent,
            last_price,
            added_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// Digest categories a user can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Crypto,
    Stocks,
    News,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Crypto => "crypto",
            Category::Stocks => "stocks",
            Category::News => "news",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crypto" => Ok(Category::Crypto),
            "stocks" => Ok(Category::Stocks),
            "news" => Ok(Category::News),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category digest subscription flags; absent categories are off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriptions {
    #[serde(default)]
    pub crypto: bool,
    #[serde(default)]
    pub stocks: bool,
    #[serde(default)]
    pub news: bool,
}

impl Subscriptions {
    pub fn any(&self) -> bool {
        self.crypto || self.stocks || self.news
    }

    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::Crypto => self.crypto,
            Category::Stocks => self.stocks,
            Category::News => self.news,
        }
    }

    /// Flips one category and returns its new state.
    pub fn toggle(&mut self, category: Category) -> bool {
        let flag = match category {
            Category::Crypto => &mut self.crypto,
            Category::Stocks => &mut self.stocks,
            Category::News => &mut self.news,
        };
        *flag = !*flag;
        *flag
    }
}

/// A registered bot user with their tracking list and digest subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_authenticated: bool,
    #[serde(default)]
    pub subscriptions: Subscriptions,
    #[serde(default)]
    pub tracked_tickers: Vec<TrackedTicker>,
}

impl User {
    pub fn new(telegram_id: i64, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: 0,
            telegram_id,
            email: email.into(),
            password_hash: password_hash.into(),
            is_authenticated: false,
            subscriptions: Subscriptions::default(),
            tracked_tickers: Vec::new(),
        }
    }

    /// Removes a tracked ticker; returns whether it existed.
    pub fn remove_ticker(&mut self, symbol: &str) -> bool {
        let before = self.tracked_tickers.len();
        self.tracked_tickers.retain(|t| t.symbol != symbol);
        self.tracked_tickers.len() != before
    }
}

/// Plain keyword subscription for the news feed, unique per user
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSubscription {
    pub user_id: i64,
    pub query: String,
}
