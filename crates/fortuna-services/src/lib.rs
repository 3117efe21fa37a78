//! Business logic services for Fortuna Rewards
//!
//! This crate contains all the business logic that orchestrates the daily
//! draw, the point ledger, and the reward shop.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its repositories behind trait objects
//! - Services are cheap to clone and safe to share across async tasks
//! - Contended flows take row leases before checking, then mutate
//! - All operations are instrumented with tracing
//!
//! # Services
//!
//! - `SpinService` - Daily draw with budget-bounded awards
//! - `PointLedger` - Balance queries and first-in-first-out spending
//! - `OrderService` - Reward shop purchases and cancellations
//! - `ProductService` - Catalog reads and admin catalog management
//! - `AdminService` - Budget management and operational summaries
//! - `AuthService` - Login and identity lookups

pub mod admin;
pub mod auth;
pub mod ledger;
pub mod orders;
pub mod products;
pub mod spin;

pub use admin::{AdminService, DashboardSummary, ParticipationView};
pub use auth::AuthService;
pub use ledger::{BalanceSummary, PointLedger};
pub use orders::OrderService;
pub use products::{ProductService, ProductUpdate};
pub use spin::{CancelOutcome, SpinRecord, SpinResult, SpinService, SpinStatus};

/// Business logic constants
pub mod constants {
    /// Largest award a single spin may grant
    pub const SPIN_MAX_POINTS: i64 = 1000;

    /// Smallest award a single spin may grant
    pub const SPIN_MIN_POINTS: i64 = 100;

    /// Days ahead that count as "expiring soon" in balance summaries
    pub const EXPIRING_SOON_DAYS: i64 = 7;
}
