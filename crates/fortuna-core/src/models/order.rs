//! Point shop order model

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order went through; points were taken and stock reserved
    #[default]
    Completed,
    /// Order was cancelled; points refunded and stock returned
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl OrderStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "COMPLETED" => Some(OrderStatus::Completed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the order still stands
    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

/// Point shop order entity
///
/// `product_name` and `price` are snapshots taken at purchase time, so
/// later catalog edits never change what an existing order shows or what
/// a cancellation refunds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: i64,

    /// The buyer
    pub user_id: i64,

    /// The purchased product
    pub product_id: i64,

    /// Product name at purchase time
    pub product_name: String,

    /// Points paid
    pub price: i64,

    /// Current status
    pub status: OrderStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new completed order
    pub fn new(user_id: i64, product_id: i64, product_name: String, price: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            product_id,
            product_name,
            price,
            status: OrderStatus::Completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cancel this order
    ///
    /// # Errors
    ///
    /// Returns `AppError::OrderAlreadyCancelled` if it was cancelled
    /// before.
    pub fn cancel(&mut self) -> Result<(), AppError> {
        if self.status == OrderStatus::Cancelled {
            return Err(AppError::OrderAlreadyCancelled(self.id));
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }
}
