pub mod models;
mod memory;

pub use memory::MemoryDatabase;

use async_trait::async_trait;

use crate::errors::Result;
use models::{NewsSubscription, User};

/// Abstract user store consumed by the engines and the transport layer.
///
/// The bot only ever loads a whole user record, mutates it, and saves it
/// back; write granularity is one user.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Users with at least one digest category enabled.
    async fn find_users_with_any_subscription(&self) -> Result<Vec<User>>;

    /// Users with a non-empty tracking list.
    async fn find_users_with_tracked_tickers(&self) -> Result<Vec<User>>;

    /// Inserts a new user and returns it with its assigned id.
    async fn insert_user(&self, user: User) -> Result<User>;

    /// Upserts an existing user record.
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Adds a news keyword subscription; returns false if the query is
    /// already present for that user.
    async fn add_news_subscription(&self, sub: NewsSubscription) -> Result<bool>;
}
