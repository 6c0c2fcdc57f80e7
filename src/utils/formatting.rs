/// Utility functions for formatting display values in chat messages.

/// Format a market price for display.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Format a percentage change for display.
pub fn format_percent(pct: f64) -> String {
    format!("{:.2}%", pct)
}
