//! Request and response DTOs
//!
//! JSON bodies are camelCase on the wire. Responses convert from domain
//! entities with `From` impls so handlers stay thin.

pub mod admin;
pub mod auth;
pub mod order;
pub mod point;
pub mod product;
pub mod spin;

pub use admin::{
    AdminParticipationResponse, BudgetResponse, BudgetUpdateRequest, CancelParticipationResponse,
    DashboardResponse,
};
pub use auth::{LoginRequest, UserResponse};
pub use order::{OrderCreateRequest, OrderResponse};
pub use point::{BalanceResponse, PointEntryResponse};
pub use product::{ProductCreateRequest, ProductResponse, ProductUpdateRequest};
pub use spin::{SpinHistoryResponse, SpinResponse, SpinStatusResponse};
