//! In-process store
//!
//! Owns every table, the id sequences, and the row-lock maps. Repositories
//! borrow the store through an `Arc` the same way a SQL-backed layer would
//! share a connection pool.

use crate::locks::RowLocks;
use chrono::NaiveDate;
use fortuna_core::models::{DailyBudget, Order, Participation, PointEntry, Product, User};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Tunable store behavior
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Maximum wait for a contended row lock
    pub lock_wait: Duration,

    /// Total a fresh daily budget row starts with
    pub daily_budget_total: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            lock_wait: Duration::from_millis(3000),
            daily_budget_total: DailyBudget::DEFAULT_TOTAL,
        }
    }
}

/// Participation table with its `(user_id, date)` unique index
#[derive(Default)]
pub(crate) struct ParticipationTable {
    pub(crate) by_id: HashMap<i64, Participation>,
    pub(crate) by_user_date: HashMap<(i64, NaiveDate), i64>,
}

/// User table with its username unique index
#[derive(Default)]
pub(crate) struct UserTable {
    pub(crate) by_id: HashMap<i64, User>,
    pub(crate) by_username: HashMap<String, i64>,
}

/// The backing store shared by all repositories
pub struct MemStore {
    pub(crate) settings: StoreSettings,

    // Tables
    pub(crate) budgets: RwLock<HashMap<NaiveDate, DailyBudget>>,
    pub(crate) participations: RwLock<ParticipationTable>,
    pub(crate) points: RwLock<HashMap<i64, PointEntry>>,
    pub(crate) products: RwLock<HashMap<i64, Product>>,
    pub(crate) orders: RwLock<HashMap<i64, Order>>,
    pub(crate) users: RwLock<UserTable>,

    // Id sequences
    pub(crate) budget_seq: AtomicI64,
    pub(crate) participation_seq: AtomicI64,
    pub(crate) point_seq: AtomicI64,
    pub(crate) product_seq: AtomicI64,
    pub(crate) order_seq: AtomicI64,
    pub(crate) user_seq: AtomicI64,

    // Row locks
    pub(crate) budget_locks: RowLocks<NaiveDate>,
    pub(crate) participation_locks: RowLocks<(i64, NaiveDate)>,
    pub(crate) ledger_locks: RowLocks<i64>,
    pub(crate) product_locks: RowLocks<i64>,
    pub(crate) order_locks: RowLocks<i64>,
}

impl MemStore {
    /// Create a store with default settings
    pub fn new() -> Self {
        Self::with_settings(StoreSettings::default())
    }

    /// Create a store with explicit settings
    pub fn with_settings(settings: StoreSettings) -> Self {
        let wait = settings.lock_wait;
        Self {
            settings,
            budgets: RwLock::new(HashMap::new()),
            participations: RwLock::new(ParticipationTable::default()),
            points: RwLock::new(HashMap::new()),
            products: RwLock::new(HashMap::new()),
            orders: RwLock::new(HashMap::new()),
            users: RwLock::new(UserTable::default()),
            budget_seq: AtomicI64::new(1),
            participation_seq: AtomicI64::new(1),
            point_seq: AtomicI64::new(1),
            product_seq: AtomicI64::new(1),
            order_seq: AtomicI64::new(1),
            user_seq: AtomicI64::new(1),
            budget_locks: RowLocks::new(wait),
            participation_locks: RowLocks::new(wait),
            ledger_locks: RowLocks::new(wait),
            product_locks: RowLocks::new(wait),
            order_locks: RowLocks::new(wait),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw the next id from a sequence
pub(crate) fn next_id(seq: &AtomicI64) -> i64 {
    seq.fetch_add(1, Ordering::SeqCst)
}
