//! Login and identity service
//!
//! Identity is deliberately lightweight: logging in with a new name
//! creates the user, and subsequent requests carry the user id in a
//! header. There are no passwords or sessions.

use fortuna_core::{models::User, traits::UserRepository, AppError, AppResult};
use std::sync::Arc;
use tracing::{info, instrument};

/// Login and identity service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Log in by username, creating the user on first sight
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty username.
    #[instrument(skip(self))]
    pub async fn login(&self, username: &str) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation(
                "username must not be empty".to_string(),
            ));
        }

        if let Some(user) = self.users.find_by_username(username).await? {
            return Ok(user);
        }

        match self.users.create(&User::new(username.to_string())).await {
            Ok(user) => {
                info!("Registered user {} ({})", user.id, user.username);
                Ok(user)
            }
            // Lost a signup race; the row is there now
            Err(AppError::AlreadyExists(_)) => self
                .users
                .find_by_username(username)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("user {username} exists but cannot be read"))
                }),
            Err(e) => Err(e),
        }
    }

    /// Look up the logged-in user
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: i64) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))
    }
}
