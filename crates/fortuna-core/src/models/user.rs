//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
///
/// Identity is intentionally thin: a user is created on first login and
/// identified by the `X-User-Id` header afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,

    /// Login name, unique across users
    pub username: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(username: String) -> Self {
        Self {
            id: 0,
            username,
            created_at: Utc::now(),
        }
    }
}
