#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use price_tracker_bot::db::models::{TrackedTicker, User};
use price_tracker_bot::db::{MemoryDatabase, UserRepository};
use price_tracker_bot::errors::Result;
use price_tracker_bot::notify::Notifier;
use price_tracker_bot::sources::{PriceQuote, PriceSource};

/// Price source fed from per-symbol scripts of canned responses.
///
/// `Some(price)` yields a successful quote (including a literal zero price),
/// `None` a failure quote. When a symbol's script runs dry the constant
/// price set via [`ScriptedSource::always`] answers, else the call fails.
pub struct ScriptedSource {
    name: &'static str,
    script: Mutex<HashMap<String, VecDeque<Option<f64>>>>,
    constants: Mutex<HashMap<String, f64>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Mutex::new(HashMap::new()),
            constants: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, symbol: &str, response: Option<f64>) {
        self.script
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn always(&self, symbol: &str, price: f64) {
        self.constants.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, symbol: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|s| *s == symbol).count()
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, symbol: &str) -> PriceQuote {
        self.calls.lock().unwrap().push(symbol.to_string());

        let scripted = self
            .script
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(Some(price)) => PriceQuote::ok(symbol, price, self.name),
            Some(None) => PriceQuote::failed(symbol, self.name),
            None => match self.constants.lock().unwrap().get(symbol) {
                Some(price) => PriceQuote::ok(symbol, *price, self.name),
                None => PriceQuote::failed(symbol, self.name),
            },
        }
    }
}

/// Notifier that records every outbound message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Inserts a user bound to `telegram_id` with one optional tracked ticker.
pub async fn seed_user(
    db: &MemoryDatabase,
    telegram_id: i64,
    ticker: Option<TrackedTicker>,
) -> User {
    let mut user = db
        .insert_user(User::new(
            telegram_id,
            format!("user{}@example.com", telegram_id),
            "hash",
        ))
        .await
        .unwrap();
    user.is_authenticated = true;
    if let Some(ticker) = ticker {
        user.tracked_tickers.push(ticker);
    }
    db.save_user(&user).await.unwrap();
    user
}

pub fn ticker(symbol: &str, threshold: f64, last_price: Option<f64>) -> TrackedTicker {
    TrackedTicker::new(symbol, threshold, last_price)
}
