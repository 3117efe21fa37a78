//! Auth handlers

use crate::dto::auth::{LoginRequest, UserResponse};
use crate::handlers::identity::CurrentUser;
use actix_web::{web, HttpResponse};
use fortuna_core::AppError;
use fortuna_services::AuthService;
use tracing::{instrument, warn};
use validator::Validate;

/// Log in by username, creating the user on first sight
///
/// POST /api/v1/auth/login
#[instrument(skip(service, req))]
pub async fn login(
    service: web::Data<AuthService>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Login validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let user = service.login(&req.username).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Look up the logged-in user
///
/// GET /api/v1/auth/me
#[instrument(skip(service))]
pub async fn me(
    service: web::Data<AuthService>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let user = service.me(user.id()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Mount auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}
