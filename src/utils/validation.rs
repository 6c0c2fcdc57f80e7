use regex::Regex;
use std::sync::OnceLock;

use crate::errors::{BotError, Result};

/// Input validation for user-supplied command arguments.
pub struct Validator;

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9.\-]{1,16}$").expect("valid symbol regex"))
}

impl Validator {
    /// Uppercases a raw ticker argument and rejects anything that does not
    /// look like an exchange symbol.
    pub fn normalize_symbol(raw: &str) -> Result<String> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(BotError::validation("ticker symbol is empty").into());
        }
        if !symbol_pattern().is_match(&symbol) {
            return Err(BotError::validation(format!("'{}' is not a valid ticker symbol", raw)).into());
        }
        Ok(symbol)
    }

    /// Parses a user-supplied alert threshold in percent.
    pub fn parse_threshold(raw: &str) -> Result<f64> {
        let threshold: f64 = raw
            .trim()
            .parse()
            .map_err(|_| BotError::validation(format!("'{}' is not a valid threshold", raw)))?;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(BotError::validation("threshold must be a positive percentage").into());
        }
        Ok(threshold)
    }
}
