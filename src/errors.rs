use thiserror::Error;

/// Application-level result alias used throughout the bot.
pub type Result<T> = anyhow::Result<T>;

/// Error taxonomy for the bot.
///
/// Upstream and symbol-lookup failures are recovered locally inside the
/// price-source adapters; resolution exhaustion and persistence failures are
/// per-ticker/per-user boundaries and never abort a scheduler pass.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{source_name} error: {message}")]
    Upstream {
        source_name: &'static str,
        message: String,
    },

    #[error("Unknown symbol: {0}")]
    SymbolNotFound(String),

    #[error("No price source could resolve {0}")]
    ResolutionExhausted(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl BotError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            source_name,
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
