//! Repository traits for storage access
//!
//! Services depend on these abstractions rather than on a concrete store.
//! Repositories that guard contended rows also hand out [`RowLock`] leases,
//! the pessimistic-locking primitive the whole engine is built on.

use crate::error::AppError;
use crate::models::{DailyBudget, Order, Participation, PointEntry, Product, User};
use async_trait::async_trait;
use chrono::NaiveDate;

/// An exclusive lease on a storage row
///
/// Whoever holds the lease is the only writer for that row until the value
/// is dropped. The inner guard is opaque so the storage crate can use
/// whatever lock guard it likes without this crate depending on it.
pub struct RowLock {
    _hold: Box<dyn Send>,
}

impl RowLock {
    /// Wrap a lock guard for the duration of a critical section
    pub fn new(hold: impl Send + 'static) -> Self {
        Self {
            _hold: Box::new(hold),
        }
    }
}

impl std::fmt::Debug for RowLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RowLock")
    }
}

/// Daily budget repository
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Take the exclusive lease on a day's budget row
    async fn lock(&self, date: NaiveDate) -> Result<RowLock, AppError>;

    /// Find the budget row for a day, if one was created
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<DailyBudget>, AppError>;

    /// Find the budget row for a day, creating it with the default total if missing
    async fn find_or_create(&self, date: NaiveDate) -> Result<DailyBudget, AppError>;

    /// Read a day's budget without creating a row
    ///
    /// When no row exists, returns the default-valued budget that
    /// [`find_or_create`] would insert, but leaves storage untouched.
    ///
    /// [`find_or_create`]: BudgetRepository::find_or_create
    async fn find_or_default(&self, date: NaiveDate) -> Result<DailyBudget, AppError>;

    /// Persist budget changes
    async fn update(&self, budget: &DailyBudget) -> Result<DailyBudget, AppError>;
}

/// Draw participation repository
#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    /// Take the exclusive lease on one user's slot for one day
    async fn lock(&self, user_id: i64, date: NaiveDate) -> Result<RowLock, AppError>;

    /// Find participation by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Participation>, AppError>;

    /// Find a user's participation for a specific day
    async fn find_by_user_and_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Participation>, AppError>;

    /// List a user's participations, newest first
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Participation>, AppError>;

    /// List every participation on one day, newest first
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Participation>, AppError>;

    /// Insert a new participation
    ///
    /// Enforces the `(user_id, date)` unique constraint and fails with
    /// `AppError::AlreadyExists` on a duplicate.
    async fn create(&self, participation: &Participation) -> Result<Participation, AppError>;

    /// Persist participation changes
    async fn update(&self, participation: &Participation) -> Result<Participation, AppError>;
}

/// Point ledger repository
#[async_trait]
pub trait PointRepository: Send + Sync {
    /// Take the exclusive lease on one user's ledger
    async fn lock_user(&self, user_id: i64) -> Result<RowLock, AppError>;

    /// Find entry by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<PointEntry>, AppError>;

    /// List all of a user's entries, newest first
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<PointEntry>, AppError>;

    /// List a user's spendable entries, soonest-expiring first
    ///
    /// Only entries that are effectively `Earned` with points left are
    /// returned, in the order a spend should drain them.
    async fn find_usable_by_user(&self, user_id: i64) -> Result<Vec<PointEntry>, AppError>;

    /// Insert a new ledger entry
    async fn create(&self, entry: &PointEntry) -> Result<PointEntry, AppError>;

    /// Persist entry changes
    async fn update(&self, entry: &PointEntry) -> Result<PointEntry, AppError>;
}

/// Reward shop product repository
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Take the exclusive lease on a product row
    async fn lock(&self, id: i64) -> Result<RowLock, AppError>;

    /// Find product by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError>;

    /// List all products, oldest first
    async fn find_all(&self) -> Result<Vec<Product>, AppError>;

    /// Insert a new product
    async fn create(&self, product: &Product) -> Result<Product, AppError>;

    /// Persist product changes
    async fn update(&self, product: &Product) -> Result<Product, AppError>;
}

/// Point shop order repository
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Take the exclusive lease on an order row
    async fn lock(&self, id: i64) -> Result<RowLock, AppError>;

    /// Find order by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError>;

    /// List a user's orders, newest first
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError>;

    /// List all orders, newest first
    async fn find_all(&self) -> Result<Vec<Order>, AppError>;

    /// Insert a new order
    async fn create(&self, order: &Order) -> Result<Order, AppError>;

    /// Persist order changes
    async fn update(&self, order: &Order) -> Result<Order, AppError>;
}

/// User repository
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find user by login name
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user
    ///
    /// Enforces username uniqueness and fails with
    /// `AppError::AlreadyExists` on a duplicate.
    async fn create(&self, user: &User) -> Result<User, AppError>;
}
