//! Product catalog DTOs

use chrono::{DateTime, Utc};
use fortuna_core::models::Product;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Product ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Price in points
    pub price: i64,

    /// Units left in stock
    pub stock: i64,

    /// AVAILABLE or UNAVAILABLE
    pub status: String,

    /// When the product was listed
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            status: product.status.to_string(),
            created_at: product.created_at,
        }
    }
}

/// Product creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Product name is required"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Price in points, must be positive
    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price: i64,

    /// Initial stock, must not be negative
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i64,
}

/// Partial product update request
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Product name must not be empty"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New price in points
    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price: Option<i64>,

    /// New stock count
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i64>,

    /// New status, AVAILABLE or UNAVAILABLE
    pub status: Option<String>,
}
