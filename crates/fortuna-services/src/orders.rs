//! Reward shop order service
//!
//! Purchases and cancellations:
//! - A purchase takes the product lease, verifies status and stock, then
//!   pays through the ledger and takes one unit of stock
//! - A cancellation refunds the paid points as a fresh grant and returns
//!   the unit to stock
//!
//! Leases are always taken in the same order (order row, then product,
//! then ledger), so concurrent flows cannot deadlock.

use fortuna_core::{
    models::{Order, ProductStatus},
    traits::{OrderRepository, ProductRepository, UserRepository},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::ledger::PointLedger;

/// Reward shop order service
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
    ledger: PointLedger,
}

impl OrderService {
    /// Create a new order service
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        ledger: PointLedger,
    ) -> Self {
        Self {
            orders,
            products,
            users,
            ledger,
        }
    }

    /// Buy one unit of a product with points
    ///
    /// # Arguments
    ///
    /// * `user_id` - The buyer
    /// * `product_id` - The product to buy
    ///
    /// # Returns
    ///
    /// The completed order
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The user or product does not exist
    /// - The product is delisted or out of stock
    /// - The user's balance cannot cover the price
    /// - A row lease cannot be taken in time
    #[instrument(skip(self))]
    pub async fn place_order(&self, user_id: i64, product_id: i64) -> AppResult<Order> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))?;
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;

        // Serialize buyers on the product row
        let _product_lease = self.products.lock(product_id).await?;

        let mut product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;

        if product.status != ProductStatus::Available {
            return Err(AppError::ProductNotAvailable(product_id));
        }
        if product.stock <= 0 {
            warn!("Product {} sold out under contention", product_id);
            return Err(AppError::InsufficientStock(product_id));
        }

        // Take payment; fails without touching stock if the balance is short
        self.ledger.spend(user_id, product.price).await?;

        // Stock cannot have moved while we hold the product lease
        product.decrease_stock()?;
        self.products.update(&product).await?;

        let order = self
            .orders
            .create(&Order::new(
                user_id,
                product_id,
                product.name.clone(),
                product.price,
            ))
            .await?;

        info!(
            "User {} bought product {} for {} points (order {})",
            user_id, product_id, product.price, order.id
        );
        Ok(order)
    }

    /// List a user's orders, newest first
    #[instrument(skip(self))]
    pub async fn my_orders(&self, user_id: i64) -> AppResult<Vec<Order>> {
        self.orders.find_by_user(user_id).await
    }

    /// Get one order
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> AppResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))
    }

    /// Cancel an order, refunding its points and returning stock
    ///
    /// The refund is a fresh grant with a fresh expiry window; the original
    /// entries that paid for the order stay spent.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The order does not exist or is already cancelled
    /// - A row lease cannot be taken in time
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: i64) -> AppResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))?;

        // Serialize against other cancels of the same order
        let _order_lease = self.orders.lock(order_id).await?;

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))?;
        order.cancel()?;

        // Refund as a fresh grant
        self.ledger.mint(order.user_id, order.price).await?;

        // Return the unit if the product still exists
        if self.products.find_by_id(order.product_id).await?.is_some() {
            let _product_lease = self.products.lock(order.product_id).await?;
            if let Some(mut product) = self.products.find_by_id(order.product_id).await? {
                product.increase_stock();
                self.products.update(&product).await?;
            }
        } else {
            warn!(
                "Product {} is gone; order {} cancelled without restock",
                order.product_id, order_id
            );
        }

        let order = self.orders.update(&order).await?;

        info!(
            "Cancelled order {}; refunded {} points to user {}",
            order_id, order.price, order.user_id
        );
        Ok(order)
    }
}
