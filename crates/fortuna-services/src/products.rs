//! Product catalog service
//!
//! Catalog reads for the shop plus the admin-side catalog management.
//! Edits take the product lease so stock adjustments never race a
//! purchase.

use fortuna_core::{
    models::{Product, ProductStatus},
    traits::ProductRepository,
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Partial update for a product
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
}

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    /// Create a new product service
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    fn validate_name(name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "product name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_price(price: i64) -> AppResult<()> {
        if price <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "product price must be positive, got {price}"
            )));
        }
        Ok(())
    }

    fn validate_stock(stock: i64) -> AppResult<()> {
        if stock < 0 {
            return Err(AppError::InvalidArgument(format!(
                "product stock must not be negative, got {stock}"
            )));
        }
        Ok(())
    }

    /// List the catalog, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        self.products.find_all().await
    }

    /// Get one product
    #[instrument(skip(self))]
    pub async fn get(&self, product_id: i64) -> AppResult<Product> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))
    }

    /// Add a product to the catalog
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` for an empty name, a
    /// non-positive price or negative stock.
    #[instrument(skip(self, description))]
    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
        price: i64,
        stock: i64,
    ) -> AppResult<Product> {
        Self::validate_name(&name)?;
        Self::validate_price(price)?;
        Self::validate_stock(stock)?;

        let product = self
            .products
            .create(&Product::new(name, description, price, stock))
            .await?;
        info!("Added product {} ({})", product.id, product.name);
        Ok(product)
    }

    /// Apply a partial update to a product
    ///
    /// # Errors
    ///
    /// Returns error if the product does not exist, a changed field fails
    /// validation, or the product lease cannot be taken in time.
    #[instrument(skip(self, update))]
    pub async fn update(&self, product_id: i64, update: ProductUpdate) -> AppResult<Product> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;

        // Stock edits must not race purchases
        let _product_lease = self.products.lock(product_id).await?;

        let mut product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;

        if let Some(name) = update.name {
            Self::validate_name(&name)?;
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(price) = update.price {
            Self::validate_price(price)?;
            product.price = price;
        }
        if let Some(stock) = update.stock {
            Self::validate_stock(stock)?;
            product.stock = stock;
        }
        if let Some(status) = update.status {
            product.status = status;
        }
        product.updated_at = chrono::Utc::now();

        let product = self.products.update(&product).await?;
        info!("Updated product {}", product.id);
        Ok(product)
    }

    /// Delist a product
    ///
    /// Soft delete: the row stays so order snapshots and refunds keep
    /// resolving.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, product_id: i64) -> AppResult<Product> {
        let _product_lease = self.products.lock(product_id).await?;

        let mut product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;
        product.deactivate();
        let product = self.products.update(&product).await?;
        info!("Delisted product {}", product.id);
        Ok(product)
    }
}
