use std::sync::Arc;
use tracing::info;

use crate::db::models::User;
use crate::db::UserRepository;
use crate::errors::Result;

/// Registration and login state for bot users.
pub struct AccountService {
    db: Arc<dyn UserRepository>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    EmailTaken,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    BadCredentials,
}

impl AccountService {
    pub fn new(db: Arc<dyn UserRepository>) -> Self {
        Self { db }
    }

    /// Creates an account and logs the user in immediately.
    pub async fn register(&self, telegram_id: i64, email: &str, password: &str) -> Result<RegisterOutcome> {
        if self.db.find_user_by_email(email).await?.is_some() {
            return Ok(RegisterOutcome::EmailTaken);
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let mut user = User::new(telegram_id, email, password_hash);
        user.is_authenticated = true;
        let user = self.db.insert_user(user).await?;

        info!("registered user {} (telegram {})", user.id, telegram_id);
        Ok(RegisterOutcome::Created)
    }

    /// Verifies credentials and binds the account to the current chat.
    pub async fn login(&self, telegram_id: i64, email: &str, password: &str) -> Result<LoginOutcome> {
        let Some(mut user) = self.db.find_user_by_email(email).await? else {
            return Ok(LoginOutcome::BadCredentials);
        };

        if !bcrypt::verify(password, &user.password_hash)? {
            return Ok(LoginOutcome::BadCredentials);
        }

        user.is_authenticated = true;
        user.telegram_id = telegram_id;
        self.db.save_user(&user).await?;

        info!("user {} logged in (telegram {})", user.id, telegram_id);
        Ok(LoginOutcome::LoggedIn)
    }

    /// Clears the authenticated flag; a no-op for unknown chats.
    pub async fn logout(&self, telegram_id: i64) -> Result<()> {
        if let Some(mut user) = self.db.find_user_by_telegram_id(telegram_id).await? {
            user.is_authenticated = false;
            self.db.save_user(&user).await?;
            info!("user {} logged out", user.id);
        }
        Ok(())
    }

    /// The user bound to this chat, if they are currently authenticated.
    pub async fn authenticated(&self, telegram_id: i64) -> Result<Option<User>> {
        Ok(self
            .db
            .find_user_by_telegram_id(telegram_id)
            .await?
            .filter(|u| u.is_authenticated))
    }
}
