//! Point ledger service
//!
//! Balance queries and spending over a user's earn entries. Spending
//! drains the soonest-expiring grant first, which keeps points from
//! going to waste.

use chrono::{Duration, Utc};
use fortuna_core::{
    models::PointEntry,
    traits::PointRepository,
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::constants::EXPIRING_SOON_DAYS;

/// A user's spendable balance at a glance
#[derive(Debug, Clone, Copy)]
pub struct BalanceSummary {
    /// Total spendable points
    pub available: i64,

    /// Portion of `available` that expires within the soon window
    pub expiring_soon: i64,
}

/// Point ledger service
#[derive(Clone)]
pub struct PointLedger {
    points: Arc<dyn PointRepository>,
}

impl PointLedger {
    /// Create a new point ledger
    pub fn new(points: Arc<dyn PointRepository>) -> Self {
        Self { points }
    }

    /// Summarize a user's spendable balance
    #[instrument(skip(self))]
    pub async fn balance(&self, user_id: i64) -> AppResult<BalanceSummary> {
        let usable = self.points.find_usable_by_user(user_id).await?;
        let cutoff = Utc::now() + Duration::days(EXPIRING_SOON_DAYS);

        let mut available = 0;
        let mut expiring_soon = 0;
        for entry in &usable {
            available += entry.available();
            if entry.expires_at <= cutoff {
                expiring_soon += entry.available();
            }
        }

        Ok(BalanceSummary {
            available,
            expiring_soon,
        })
    }

    /// List all of a user's ledger entries, newest first
    #[instrument(skip(self))]
    pub async fn entries(&self, user_id: i64) -> AppResult<Vec<PointEntry>> {
        self.points.find_by_user(user_id).await
    }

    /// List spendable entries that expire within `days`, soonest first
    #[instrument(skip(self))]
    pub async fn expiring_within(&self, user_id: i64, days: i64) -> AppResult<Vec<PointEntry>> {
        let cutoff = Utc::now() + Duration::days(days);
        let rows = self
            .points
            .find_usable_by_user(user_id)
            .await?
            .into_iter()
            .filter(|e| e.expires_at <= cutoff)
            .collect();
        Ok(rows)
    }

    /// Spend points from a user's balance
    ///
    /// Takes the user's ledger lease, verifies the balance covers the
    /// amount, then drains entries soonest-expiring first. Either the full
    /// amount is spent or nothing is.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `amount` is not positive
    /// - The spendable balance is below `amount`
    /// - The ledger lease cannot be taken in time
    #[instrument(skip(self))]
    pub async fn spend(&self, user_id: i64, amount: i64) -> AppResult<()> {
        if amount <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "spend amount must be positive, got {amount}"
            )));
        }

        let _ledger_lease = self.points.lock_user(user_id).await?;

        let usable = self.points.find_usable_by_user(user_id).await?;
        let available: i64 = usable.iter().map(|e| e.available()).sum();
        if available < amount {
            warn!(
                "User {} cannot spend {}: only {} available",
                user_id, amount, available
            );
            return Err(AppError::InsufficientPoints {
                required: amount,
                available,
            });
        }

        let mut remaining = amount;
        for mut entry in usable {
            if remaining == 0 {
                break;
            }
            let taken = entry.consume(remaining);
            if taken == 0 {
                continue;
            }
            remaining -= taken;
            debug!("Drained {} points from entry {}", taken, entry.id);
            self.points.update(&entry).await?;
        }

        if remaining > 0 {
            return Err(AppError::Internal(format!(
                "spend of {amount} for user {user_id} left {remaining} unpaid"
            )));
        }

        info!("User {} spent {} points", user_id, amount);
        Ok(())
    }

    /// Grant points as a fresh entry with the default expiry window
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if `amount` is not positive.
    #[instrument(skip(self))]
    pub async fn mint(&self, user_id: i64, amount: i64) -> AppResult<PointEntry> {
        if amount <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "mint amount must be positive, got {amount}"
            )));
        }

        let entry = self.points.create(&PointEntry::new(user_id, amount)).await?;
        info!(
            "Granted {} points to user {} as entry {}",
            amount, user_id, entry.id
        );
        Ok(entry)
    }
}
