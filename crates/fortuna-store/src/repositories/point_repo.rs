//! Point ledger repository implementation

use crate::store::{next_id, MemStore};
use async_trait::async_trait;
use fortuna_core::{
    models::PointEntry,
    traits::{PointRepository, RowLock},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// In-process implementation of PointRepository
pub struct MemPointRepository {
    store: Arc<MemStore>,
}

impl MemPointRepository {
    /// Create a new point repository
    pub fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PointRepository for MemPointRepository {
    #[instrument(skip(self))]
    async fn lock_user(&self, user_id: i64) -> AppResult<RowLock> {
        self.store
            .ledger_locks
            .acquire(user_id, format!("ledger user {user_id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<PointEntry>> {
        Ok(self.store.points.read().get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<PointEntry>> {
        let mut rows: Vec<PointEntry> = {
            let points = self.store.points.read();
            points
                .values()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.earned_at.cmp(&a.earned_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_usable_by_user(&self, user_id: i64) -> AppResult<Vec<PointEntry>> {
        let mut rows: Vec<PointEntry> = {
            let points = self.store.points.read();
            points
                .values()
                .filter(|e| e.user_id == user_id && e.is_usable())
                .cloned()
                .collect()
        };
        // Spend order: soonest-expiring grant drains first
        rows.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    #[instrument(skip(self, entry))]
    async fn create(&self, entry: &PointEntry) -> AppResult<PointEntry> {
        let mut row = entry.clone();
        row.id = next_id(&self.store.point_seq);
        debug!(
            "Creating point entry {} for user {} amount {}",
            row.id, row.user_id, row.amount
        );

        self.store.points.write().insert(row.id, row.clone());
        Ok(row)
    }

    #[instrument(skip(self, entry))]
    async fn update(&self, entry: &PointEntry) -> AppResult<PointEntry> {
        let mut points = self.store.points.write();
        match points.get_mut(&entry.id) {
            Some(slot) => {
                *slot = entry.clone();
                Ok(entry.clone())
            }
            None => Err(AppError::Internal(format!(
                "point entry {} does not exist",
                entry.id
            ))),
        }
    }
}
