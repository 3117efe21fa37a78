//! Fortuna Rewards Storage Layer
//!
//! This crate provides in-process storage and repository implementations
//! for the Fortuna Rewards system. It includes:
//!
//! - Hash-map tables guarded by `parking_lot` read-write locks
//! - Keyed pessimistic row locks with a bounded wait
//! - Repository implementations for all domain entities
//!
//! Table guards are only ever held for the duration of one read or write;
//! cross-operation exclusivity comes from the row locks handed out by the
//! repositories.

pub mod locks;
pub mod repositories;
pub mod store;

pub use repositories::*;
pub use store::{MemStore, StoreSettings};

// Re-export commonly used types
pub use fortuna_core::{AppError, AppResult};
