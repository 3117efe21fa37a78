//! HTTP API layer for Fortuna Rewards
//!
//! Request/response DTOs and actix-web handlers for the daily draw, the
//! point ledger, the reward shop, and the admin console. Each feature area
//! exposes a `configure` function the binary mounts under `/api/v1`.

pub mod dto;
pub mod handlers;

pub use handlers::{
    configure_admin, configure_auth, configure_orders, configure_points, configure_products,
    configure_spin, CurrentUser,
};
