//! Reward shop product model

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Product is listed and orderable while stock lasts
    #[default]
    Available,
    /// Product is delisted and cannot be ordered
    Unavailable,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Available => write!(f, "AVAILABLE"),
            ProductStatus::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

impl ProductStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AVAILABLE" => Some(ProductStatus::Available),
            "UNAVAILABLE" => Some(ProductStatus::Unavailable),
            _ => None,
        }
    }
}

/// Reward shop product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: i64,

    /// Display name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Price in points
    pub price: i64,

    /// Units left in stock
    pub stock: i64,

    /// Current status
    pub status: ProductStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product
    pub fn new(name: String, description: Option<String>, price: i64, stock: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            description,
            price,
            stock,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the product can be ordered right now
    pub fn is_purchasable(&self) -> bool {
        self.status == ProductStatus::Available && self.stock > 0
    }

    /// Take one unit out of stock
    ///
    /// # Errors
    ///
    /// Returns `AppError::InsufficientStock` if no units remain.
    pub fn decrease_stock(&mut self) -> Result<(), AppError> {
        if self.stock <= 0 {
            return Err(AppError::InsufficientStock(self.id));
        }
        self.stock -= 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return one unit to stock
    pub fn increase_stock(&mut self) {
        self.stock += 1;
        self.updated_at = Utc::now();
    }

    /// Delist the product
    ///
    /// The row is kept so order snapshots and refunds stay resolvable.
    pub fn deactivate(&mut self) {
        self.status = ProductStatus::Unavailable;
        self.updated_at = Utc::now();
    }
}
