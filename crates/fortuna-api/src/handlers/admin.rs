//! Admin console handlers
//!
//! No separate admin identity exists; these routes are expected to be
//! reachable only from the back office (authentication is out of scope).

use crate::dto::admin::{
    AdminParticipationResponse, BudgetResponse, BudgetUpdateRequest, CancelParticipationResponse,
    DashboardResponse,
};
use crate::dto::order::OrderResponse;
use crate::dto::product::{ProductCreateRequest, ProductResponse, ProductUpdateRequest};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use fortuna_core::models::ProductStatus;
use fortuna_core::AppError;
use fortuna_services::{AdminService, OrderService, ProductService, ProductUpdate, SpinService};
use tracing::{instrument, warn};
use validator::Validate;

/// Summary of today's draw and shop activity
///
/// GET /api/v1/admin/dashboard
#[instrument(skip(service))]
pub async fn dashboard(service: web::Data<AdminService>) -> Result<HttpResponse, AppError> {
    let summary = service.dashboard().await?;
    Ok(HttpResponse::Ok().json(DashboardResponse::from(summary)))
}

/// Today's budget, without creating its row
///
/// GET /api/v1/admin/budget
#[instrument(skip(service))]
pub async fn get_budget(service: web::Data<AdminService>) -> Result<HttpResponse, AppError> {
    let budget = service.budget_view(Utc::now().date_naive()).await?;
    Ok(HttpResponse::Ok().json(BudgetResponse::from(budget)))
}

/// Change today's budget total
///
/// PUT /api/v1/admin/budget
#[instrument(skip(service, req))]
pub async fn set_budget(
    service: web::Data<AdminService>,
    req: web::Json<BudgetUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Budget update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let budget = service
        .set_budget_total(Utc::now().date_naive(), req.total_budget)
        .await?;
    Ok(HttpResponse::Ok().json(BudgetResponse::from(budget)))
}

/// Today's participations with their users' names
///
/// GET /api/v1/admin/participations
#[instrument(skip(service))]
pub async fn list_participations(
    service: web::Data<AdminService>,
) -> Result<HttpResponse, AppError> {
    let views = service.list_participations().await?;
    let body: Vec<AdminParticipationResponse> = views.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Cancel a participation and revoke its award
///
/// DELETE /api/v1/admin/participations/{id}
#[instrument(skip(service))]
pub async fn cancel_participation(
    service: web::Data<SpinService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.cancel_participation(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CancelParticipationResponse::from(outcome)))
}

/// Add a product to the catalog
///
/// POST /api/v1/admin/products
#[instrument(skip(service, req))]
pub async fn create_product(
    service: web::Data<ProductService>,
    req: web::Json<ProductCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Product creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let req = req.into_inner();
    let product = service
        .create(req.name, req.description, req.price, req.stock)
        .await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// Apply a partial update to a product
///
/// PUT /api/v1/admin/products/{id}
#[instrument(skip(service, req))]
pub async fn update_product(
    service: web::Data<ProductService>,
    path: web::Path<i64>,
    req: web::Json<ProductUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Product update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let req = req.into_inner();
    let status = match req.status.as_deref() {
        Some(s) => Some(ProductStatus::from_str(s).ok_or_else(|| {
            AppError::Validation(format!("unknown product status: {s}"))
        })?),
        None => None,
    };

    let product = service
        .update(
            path.into_inner(),
            ProductUpdate {
                name: req.name,
                description: req.description,
                price: req.price,
                stock: req.stock,
                status,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// Delist a product
///
/// DELETE /api/v1/admin/products/{id}
#[instrument(skip(service))]
pub async fn deactivate_product(
    service: web::Data<ProductService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let product = service.deactivate(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// Every order in the system, newest first
///
/// GET /api/v1/admin/orders
#[instrument(skip(service))]
pub async fn list_orders(service: web::Data<AdminService>) -> Result<HttpResponse, AppError> {
    let orders = service.list_orders().await?;
    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Cancel an order, refunding its points and returning stock
///
/// DELETE /api/v1/admin/orders/{id}
#[instrument(skip(service))]
pub async fn cancel_order(
    service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order = service.cancel_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// Mount admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(dashboard))
            .route("/budget", web::get().to(get_budget))
            .route("/budget", web::put().to(set_budget))
            .route("/participations", web::get().to(list_participations))
            .route(
                "/participations/{id}",
                web::delete().to(cancel_participation),
            )
            .route("/products", web::post().to(create_product))
            .route("/products/{id}", web::put().to(update_product))
            .route("/products/{id}", web::delete().to(deactivate_product))
            .route("/orders", web::get().to(list_orders))
            .route("/orders/{id}", web::delete().to(cancel_order)),
    );
}
