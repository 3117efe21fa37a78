//! Order repository implementation

use crate::store::{next_id, MemStore};
use async_trait::async_trait;
use fortuna_core::{
    models::Order,
    traits::{OrderRepository, RowLock},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// In-process implementation of OrderRepository
pub struct MemOrderRepository {
    store: Arc<MemStore>,
}

impl MemOrderRepository {
    /// Create a new order repository
    pub fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderRepository for MemOrderRepository {
    #[instrument(skip(self))]
    async fn lock(&self, id: i64) -> AppResult<RowLock> {
        self.store
            .order_locks
            .acquire(id, format!("order {id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        Ok(self.store.orders.read().get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<Order>> {
        let mut rows: Vec<Order> = {
            let orders = self.store.orders.read();
            orders
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Order>> {
        let mut rows: Vec<Order> = self.store.orders.read().values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    #[instrument(skip(self, order))]
    async fn create(&self, order: &Order) -> AppResult<Order> {
        let mut row = order.clone();
        row.id = next_id(&self.store.order_seq);
        debug!(
            "Creating order {} for user {} product {}",
            row.id, row.user_id, row.product_id
        );

        self.store.orders.write().insert(row.id, row.clone());
        Ok(row)
    }

    #[instrument(skip(self, order))]
    async fn update(&self, order: &Order) -> AppResult<Order> {
        let mut orders = self.store.orders.write();
        match orders.get_mut(&order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(order.clone())
            }
            None => Err(AppError::OrderNotFound(order.id)),
        }
    }
}
