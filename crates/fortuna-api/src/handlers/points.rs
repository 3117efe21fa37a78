//! Point ledger handlers

use crate::dto::point::{BalanceResponse, PointEntryResponse};
use crate::handlers::identity::CurrentUser;
use actix_web::{web, HttpResponse};
use fortuna_core::AppError;
use fortuna_services::{constants::EXPIRING_SOON_DAYS, PointLedger};
use tracing::instrument;

/// All of the user's ledger entries, newest first
///
/// GET /api/v1/points
#[instrument(skip(ledger))]
pub async fn entries(
    ledger: web::Data<PointLedger>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let rows = ledger.entries(user.id()).await?;
    let body: Vec<PointEntryResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// The user's spendable balance
///
/// GET /api/v1/points/balance
#[instrument(skip(ledger))]
pub async fn balance(
    ledger: web::Data<PointLedger>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let summary = ledger.balance(user.id()).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse::from(summary)))
}

/// Spendable entries expiring soon, soonest first
///
/// GET /api/v1/points/expiring
#[instrument(skip(ledger))]
pub async fn expiring(
    ledger: web::Data<PointLedger>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let rows = ledger.expiring_within(user.id(), EXPIRING_SOON_DAYS).await?;
    let body: Vec<PointEntryResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Mount ledger routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/points")
            .route("", web::get().to(entries))
            .route("/balance", web::get().to(balance))
            .route("/expiring", web::get().to(expiring)),
    );
}
