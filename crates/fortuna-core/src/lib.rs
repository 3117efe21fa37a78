//! Fortuna Rewards Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Fortuna Rewards system. It includes:
//!
//! - Domain models (DailyBudget, Participation, PointEntry, Product, Order, User)
//! - Repository traits describing the lockable row store the services run on
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
