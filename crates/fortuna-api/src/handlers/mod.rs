//! HTTP request handlers

pub mod admin;
pub mod auth;
pub mod identity;
pub mod orders;
pub mod points;
pub mod products;
pub mod spin;

pub use admin::configure as configure_admin;
pub use auth::configure as configure_auth;
pub use identity::CurrentUser;
pub use orders::configure as configure_orders;
pub use points::configure as configure_points;
pub use products::configure as configure_products;
pub use spin::configure as configure_spin;
