//! Reward shop order DTOs

use chrono::{DateTime, Utc};
use fortuna_core::models::Order;
use serde::{Deserialize, Serialize};

/// Order creation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRequest {
    /// The product to buy one unit of
    pub product_id: i64,
}

/// Order response
///
/// `product_name` and `points_used` are purchase-time snapshots; later
/// catalog edits do not change them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Order ID
    pub order_id: i64,

    /// The purchased product
    pub product_id: i64,

    /// Product name at purchase time
    pub product_name: String,

    /// Points paid
    pub points_used: i64,

    /// COMPLETED or CANCELLED
    pub status: String,

    /// When the order was placed
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            product_id: order.product_id,
            product_name: order.product_name,
            points_used: order.price,
            status: order.status.to_string(),
            created_at: order.created_at,
        }
    }
}
