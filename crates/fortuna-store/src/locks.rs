//! Keyed pessimistic row locks
//!
//! Mimics `SELECT ... FOR UPDATE` over the in-process tables: each logical
//! row gets its own async mutex, and acquisition waits at most the
//! configured duration before failing with a lock timeout.

use fortuna_core::{traits::RowLock, AppError, AppResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A map of per-key async mutexes with bounded-wait acquisition
///
/// Lock cells are created on first use and kept for the life of the store.
/// The key space is small (days, users, products), so the map is never
/// swept.
pub struct RowLocks<K> {
    cells: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
    wait: Duration,
}

impl<K: Eq + Hash + Send> RowLocks<K> {
    /// Create a lock map with the given maximum wait per acquisition
    pub fn new(wait: Duration) -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
            wait,
        }
    }

    /// Acquire the exclusive lease for `key`
    ///
    /// `resource` names the row in the timeout error, e.g. `"budget 2024-06-01"`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::LockTimeout` if the lease cannot be taken within
    /// the configured wait.
    pub async fn acquire(&self, key: K, resource: String) -> AppResult<RowLock> {
        let cell = {
            let mut cells = self.cells.lock();
            cells
                .entry(key)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        match tokio::time::timeout(self.wait, cell.lock_owned()).await {
            Ok(guard) => Ok(RowLock::new(guard)),
            Err(_) => {
                warn!("Lock wait timed out for {}", resource);
                Err(AppError::LockTimeout(resource))
            }
        }
    }
}
