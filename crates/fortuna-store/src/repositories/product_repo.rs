//! Product repository implementation

use crate::store::{next_id, MemStore};
use async_trait::async_trait;
use fortuna_core::{
    models::Product,
    traits::{ProductRepository, RowLock},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// In-process implementation of ProductRepository
pub struct MemProductRepository {
    store: Arc<MemStore>,
}

impl MemProductRepository {
    /// Create a new product repository
    pub fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductRepository for MemProductRepository {
    #[instrument(skip(self))]
    async fn lock(&self, id: i64) -> AppResult<RowLock> {
        self.store
            .product_locks
            .acquire(id, format!("product {id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        Ok(self.store.products.read().get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Product>> {
        let mut rows: Vec<Product> = self.store.products.read().values().cloned().collect();
        rows.sort_by_key(|p| p.id);
        Ok(rows)
    }

    #[instrument(skip(self, product))]
    async fn create(&self, product: &Product) -> AppResult<Product> {
        let mut row = product.clone();
        row.id = next_id(&self.store.product_seq);
        debug!("Creating product {} ({})", row.id, row.name);

        self.store.products.write().insert(row.id, row.clone());
        Ok(row)
    }

    #[instrument(skip(self, product))]
    async fn update(&self, product: &Product) -> AppResult<Product> {
        let mut products = self.store.products.write();
        match products.get_mut(&product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(product.clone())
            }
            None => Err(AppError::ProductNotFound(product.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = MemProductRepository::new(Arc::new(MemStore::new()));

        let first = repo
            .create(&Product::new("Coffee Coupon".to_string(), None, 300, 10))
            .await
            .unwrap();
        let second = repo
            .create(&Product::new("Movie Ticket".to_string(), None, 800, 5))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
    }

    #[tokio::test]
    async fn test_update_persists_status_change() {
        let repo = MemProductRepository::new(Arc::new(MemStore::new()));

        let mut product = repo
            .create(&Product::new("Coffee Coupon".to_string(), None, 300, 10))
            .await
            .unwrap();

        product.deactivate();
        repo.update(&product).await.unwrap();

        let reloaded = repo.find_by_id(product.id).await.unwrap().unwrap();
        assert!(!reloaded.is_purchasable());
    }

    #[tokio::test]
    async fn test_update_missing_product_fails() {
        let repo = MemProductRepository::new(Arc::new(MemStore::new()));

        let ghost = Product::new("Ghost".to_string(), None, 100, 1);
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound(_)));
    }
}
