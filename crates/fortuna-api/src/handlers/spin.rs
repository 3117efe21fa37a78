//! Daily draw handlers

use crate::dto::spin::{SpinHistoryResponse, SpinResponse, SpinStatusResponse};
use crate::handlers::identity::CurrentUser;
use actix_web::{web, HttpResponse};
use fortuna_core::AppError;
use fortuna_services::SpinService;
use tracing::instrument;

/// Run today's spin for the logged-in user
///
/// POST /api/v1/spin
#[instrument(skip(service))]
pub async fn spin(
    service: web::Data<SpinService>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let result = service.spin(user.id()).await?;
    Ok(HttpResponse::Ok().json(SpinResponse::from(result)))
}

/// Today's spin state plus the day's budget
///
/// GET /api/v1/spin/status
#[instrument(skip(service))]
pub async fn status(
    service: web::Data<SpinService>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let status = service.status(user.id()).await?;
    Ok(HttpResponse::Ok().json(SpinStatusResponse::from(status)))
}

/// The user's past spins, newest first
///
/// GET /api/v1/spin/history
#[instrument(skip(service))]
pub async fn history(
    service: web::Data<SpinService>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let records = service.history(user.id()).await?;
    let body: Vec<SpinHistoryResponse> = records.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Mount draw routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/spin")
            .route("", web::post().to(spin))
            .route("/status", web::get().to(status))
            .route("/history", web::get().to(history)),
    );
}
