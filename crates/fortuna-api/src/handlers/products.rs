//! Product catalog handlers (user-facing reads)

use crate::dto::product::ProductResponse;
use actix_web::{web, HttpResponse};
use fortuna_core::models::ProductStatus;
use fortuna_core::AppError;
use fortuna_services::ProductService;
use tracing::instrument;

/// List active products, oldest first
///
/// GET /api/v1/products
#[instrument(skip(service))]
pub async fn list(service: web::Data<ProductService>) -> Result<HttpResponse, AppError> {
    let products = service.list().await?;
    let body: Vec<ProductResponse> = products
        .into_iter()
        .filter(|p| p.status == ProductStatus::Available)
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Get one product
///
/// Delisted products still resolve by ID; availability is enforced at
/// purchase time, not here.
///
/// GET /api/v1/products/{id}
#[instrument(skip(service))]
pub async fn get(
    service: web::Data<ProductService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let product = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// Mount catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list))
            .route("/{id}", web::get().to(get)),
    );
}
