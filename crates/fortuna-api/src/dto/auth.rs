//! Auth DTOs

use chrono::{DateTime, Utc};
use fortuna_core::models::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Display name; the user is created on first login
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,
}

/// User response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID, carried in `X-User-Id` on later requests
    pub id: i64,

    /// Display name
    pub username: String,

    /// When the user first logged in
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}
