//! Daily budget repository implementation
//!
//! One row per calendar day, keyed by date. The row lock handed out here
//! is the serialization point for every distribution on that day.

use crate::store::{next_id, MemStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use fortuna_core::{
    models::DailyBudget,
    traits::{BudgetRepository, RowLock},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// In-process implementation of BudgetRepository
pub struct MemBudgetRepository {
    store: Arc<MemStore>,
}

impl MemBudgetRepository {
    /// Create a new budget repository
    pub fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BudgetRepository for MemBudgetRepository {
    #[instrument(skip(self))]
    async fn lock(&self, date: NaiveDate) -> AppResult<RowLock> {
        self.store
            .budget_locks
            .acquire(date, format!("budget {date}"))
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Option<DailyBudget>> {
        Ok(self.store.budgets.read().get(&date).cloned())
    }

    #[instrument(skip(self))]
    async fn find_or_create(&self, date: NaiveDate) -> AppResult<DailyBudget> {
        if let Some(existing) = self.store.budgets.read().get(&date) {
            return Ok(existing.clone());
        }

        let mut budgets = self.store.budgets.write();
        let budget = budgets.entry(date).or_insert_with(|| {
            debug!("Creating budget row for {}", date);
            let mut budget = DailyBudget::new(date, self.store.settings.daily_budget_total);
            budget.id = next_id(&self.store.budget_seq);
            budget
        });
        Ok(budget.clone())
    }

    #[instrument(skip(self))]
    async fn find_or_default(&self, date: NaiveDate) -> AppResult<DailyBudget> {
        if let Some(existing) = self.store.budgets.read().get(&date) {
            return Ok(existing.clone());
        }
        Ok(DailyBudget::new(
            date,
            self.store.settings.daily_budget_total,
        ))
    }

    #[instrument(skip(self, budget))]
    async fn update(&self, budget: &DailyBudget) -> AppResult<DailyBudget> {
        let mut budgets = self.store.budgets.write();
        match budgets.get_mut(&budget.date) {
            Some(slot) => {
                *slot = budget.clone();
                Ok(budget.clone())
            }
            None => Err(AppError::Internal(format!(
                "budget row for {} does not exist",
                budget.date
            ))),
        }
    }
}
