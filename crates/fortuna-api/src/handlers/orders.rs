//! Reward shop order handlers

use crate::dto::order::{OrderCreateRequest, OrderResponse};
use crate::handlers::identity::CurrentUser;
use actix_web::{web, HttpResponse};
use fortuna_core::AppError;
use fortuna_services::OrderService;
use tracing::instrument;

/// Buy one unit of a product with points
///
/// POST /api/v1/orders
#[instrument(skip(service))]
pub async fn place(
    service: web::Data<OrderService>,
    user: CurrentUser,
    req: web::Json<OrderCreateRequest>,
) -> Result<HttpResponse, AppError> {
    let order = service.place_order(user.id(), req.product_id).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// The user's orders, newest first
///
/// GET /api/v1/orders
#[instrument(skip(service))]
pub async fn list(
    service: web::Data<OrderService>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let orders = service.my_orders(user.id()).await?;
    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Mount shop routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(place))
            .route("", web::get().to(list)),
    );
}
