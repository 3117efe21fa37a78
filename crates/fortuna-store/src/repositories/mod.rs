//! Repository implementations
//!
//! This module contains concrete implementations of all repository traits
//! defined in fortuna-core, backed by the in-process [`MemStore`].
//!
//! [`MemStore`]: crate::store::MemStore

pub mod budget_repo;
pub mod order_repo;
pub mod participation_repo;
pub mod point_repo;
pub mod product_repo;
pub mod user_repo;

pub use budget_repo::MemBudgetRepository;
pub use order_repo::MemOrderRepository;
pub use participation_repo::MemParticipationRepository;
pub use point_repo::MemPointRepository;
pub use product_repo::MemProductRepository;
pub use user_repo::MemUserRepository;
