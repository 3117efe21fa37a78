//! User repository implementation

use crate::store::{next_id, MemStore};
use async_trait::async_trait;
use fortuna_core::{models::User, traits::UserRepository, AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, instrument};

/// In-process implementation of UserRepository
pub struct MemUserRepository {
    store: Arc<MemStore>,
}

impl MemUserRepository {
    /// Create a new user repository
    pub fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.store.users.read().by_id.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let table = self.store.users.read();
        let id = match table.by_username.get(username) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(table.by_id.get(&id).cloned())
    }

    #[instrument(skip(self, user))]
    async fn create(&self, user: &User) -> AppResult<User> {
        let mut table = self.store.users.write();

        if table.by_username.contains_key(&user.username) {
            return Err(AppError::AlreadyExists(format!(
                "user {}",
                user.username
            )));
        }

        let mut row = user.clone();
        row.id = next_id(&self.store.user_seq);
        debug!("Creating user {} ({})", row.id, row.username);

        table.by_username.insert(row.username.clone(), row.id);
        table.by_id.insert(row.id, row.clone());
        Ok(row)
    }
}
