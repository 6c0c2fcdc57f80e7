use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::models::{NewsSubscription, User};
use super::UserRepository;
use crate::errors::{BotError, Result};

/// Process-local user store.
///
/// Storage mechanics are abstract behind [`UserRepository`]; this default
/// implementation keeps everything in memory and is also what the test
/// suite runs against.
pub struct MemoryDatabase {
    inner: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    next_id: i64,
    users: HashMap<i64, User>,
    news: Vec<NewsSubscription>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Store {
                next_id: 1,
                ..Store::default()
            }),
        }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let store = self.inner.read().await;
        Ok(store
            .users
            .values()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let store = self.inner.read().await;
        Ok(store
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_users_with_any_subscription(&self) -> Result<Vec<User>> {
        let store = self.inner.read().await;
        let mut users: Vec<User> = store
            .users
            .values()
            .filter(|u| u.subscriptions.any())
            .cloned()
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn find_users_with_tracked_tickers(&self) -> Result<Vec<User>> {
        let store = self.inner.read().await;
        let mut users: Vec<User> = store
            .users
            .values()
            .filter(|u| !u.tracked_tickers.is_empty())
            .cloned()
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn insert_user(&self, mut user: User) -> Result<User> {
        let mut store = self.inner.write().await;
        if store
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(BotError::persistence(format!("email {} already registered", user.email)).into());
        }
        user.id = store.next_id;
        store.next_id += 1;
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let mut store = self.inner.write().await;
        if !store.users.contains_key(&user.id) {
            return Err(BotError::persistence(format!("unknown user id {}", user.id)).into());
        }
        store.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn add_news_subscription(&self, sub: NewsSubscription) -> Result<bool> {
        let mut store = self.inner.write().await;
        let exists = store
            .news
            .iter()
            .any(|n| n.user_id == sub.user_id && n.query.eq_ignore_ascii_case(&sub.query));
        if exists {
            return Ok(false);
        }
        store.news.push(sub);
        Ok(true)
    }
}
