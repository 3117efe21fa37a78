//! Participation repository implementation
//!
//! Enforces the `(user_id, date)` unique index: one participation per user
//! per day, cancelled or not.

use crate::store::{next_id, MemStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use fortuna_core::{
    models::Participation,
    traits::{ParticipationRepository, RowLock},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// In-process implementation of ParticipationRepository
pub struct MemParticipationRepository {
    store: Arc<MemStore>,
}

impl MemParticipationRepository {
    /// Create a new participation repository
    pub fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ParticipationRepository for MemParticipationRepository {
    #[instrument(skip(self))]
    async fn lock(&self, user_id: i64, date: NaiveDate) -> AppResult<RowLock> {
        self.store
            .participation_locks
            .acquire(
                (user_id, date),
                format!("participation user {user_id} date {date}"),
            )
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Participation>> {
        Ok(self.store.participations.read().by_id.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_user_and_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> AppResult<Option<Participation>> {
        let table = self.store.participations.read();
        let id = match table.by_user_date.get(&(user_id, date)) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(table.by_id.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<Participation>> {
        let mut rows: Vec<Participation> = {
            let table = self.store.participations.read();
            table
                .by_id
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Vec<Participation>> {
        let mut rows: Vec<Participation> = {
            let table = self.store.participations.read();
            table
                .by_id
                .values()
                .filter(|p| p.date == date)
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    #[instrument(skip(self, participation))]
    async fn create(&self, participation: &Participation) -> AppResult<Participation> {
        let key = (participation.user_id, participation.date);
        let mut table = self.store.participations.write();

        if table.by_user_date.contains_key(&key) {
            return Err(AppError::AlreadyExists(format!(
                "participation for user {} on {}",
                participation.user_id, participation.date
            )));
        }

        let mut row = participation.clone();
        row.id = next_id(&self.store.participation_seq);
        debug!("Creating participation {} for user {}", row.id, row.user_id);

        table.by_user_date.insert(key, row.id);
        table.by_id.insert(row.id, row.clone());
        Ok(row)
    }

    #[instrument(skip(self, participation))]
    async fn update(&self, participation: &Participation) -> AppResult<Participation> {
        let mut table = self.store.participations.write();
        match table.by_id.get_mut(&participation.id) {
            Some(slot) => {
                *slot = participation.clone();
                Ok(participation.clone())
            }
            None => Err(AppError::ParticipationNotFound(participation.id)),
        }
    }
}
