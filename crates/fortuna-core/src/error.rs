//! Unified error handling for Fortuna Rewards
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Spin / Budget Errors ====================
    #[error("Already participated in today's draw")]
    AlreadyParticipated,

    #[error("Daily budget exhausted: requested {requested}, remaining {remaining}")]
    BudgetExhausted { requested: i64, remaining: i64 },

    #[error("Participation not found: {0}")]
    ParticipationNotFound(i64),

    #[error("Participation already cancelled: {0}")]
    ParticipationAlreadyCancelled(i64),

    #[error("Points from participation {0} are already spent")]
    PointsAlreadyUsed(i64),

    // ==================== Point Ledger Errors ====================
    #[error("Insufficient points: required {required}, available {available}")]
    InsufficientPoints { required: i64, available: i64 },

    // ==================== Catalog / Order Errors ====================
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Product not available: {0}")]
    ProductNotAvailable(i64),

    #[error("Product {0} is out of stock")]
    InsufficientStock(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order already cancelled: {0}")]
    OrderAlreadyCancelled(i64),

    // ==================== User Errors ====================
    #[error("User not found: {0}")]
    UserNotFound(i64),

    // ==================== Validation Errors ====================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ==================== Storage / Concurrency Errors ====================
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Lock wait timed out: {0}")]
    LockTimeout(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::AlreadyParticipated
            | AppError::BudgetExhausted { .. }
            | AppError::ParticipationAlreadyCancelled(_)
            | AppError::PointsAlreadyUsed(_)
            | AppError::InsufficientPoints { .. }
            | AppError::ProductNotAvailable(_)
            | AppError::InsufficientStock(_)
            | AppError::OrderAlreadyCancelled(_)
            | AppError::InvalidArgument(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::ParticipationNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::OrderNotFound(_)
            | AppError::UserNotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::AlreadyExists(_) | AppError::LockTimeout(_) | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AlreadyParticipated => "already_participated",
            AppError::BudgetExhausted { .. } => "budget_exhausted",
            AppError::ParticipationNotFound(_) => "participation_not_found",
            AppError::ParticipationAlreadyCancelled(_) => "participation_already_cancelled",
            AppError::PointsAlreadyUsed(_) => "points_already_used",
            AppError::InsufficientPoints { .. } => "insufficient_points",
            AppError::ProductNotFound(_) => "product_not_found",
            AppError::ProductNotAvailable(_) => "product_not_available",
            AppError::InsufficientStock(_) => "insufficient_stock",
            AppError::OrderNotFound(_) => "order_not_found",
            AppError::OrderAlreadyCancelled(_) => "order_already_cancelled",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::Validation(_) => "validation_error",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::LockTimeout(_) => "lock_timeout",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether a caller may reasonably retry the same request.
    ///
    /// Contention failures are transient; every other error is final for
    /// the request that produced it.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::LockTimeout(_) | AppError::Conflict(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
