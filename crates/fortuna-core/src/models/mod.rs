//! Domain models for Fortuna Rewards
//!
//! This module contains all the core domain models used throughout the application.

pub mod budget;
pub mod order;
pub mod participation;
pub mod point;
pub mod product;
pub mod user;

pub use budget::DailyBudget;
pub use order::{Order, OrderStatus};
pub use participation::{Participation, ParticipationStatus};
pub use point::{EffectivePointStatus, PointEntry, PointStatus};
pub use product::{Product, ProductStatus};
pub use user::User;
