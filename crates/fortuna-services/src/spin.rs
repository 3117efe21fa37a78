//! Daily draw service
//!
//! Runs the spin lifecycle:
//! - Award points to one spin per user per day
//! - Bound every award by the day's point budget
//! - Cancel participations, revoking points and restoring budget
//!
//! The day's budget row lease is the serialization point for spins: it is
//! taken before the duplicate check so that the check, the award roll and
//! the grant happen as one unit. The `(user_id, date)` unique index in
//! storage backstops the duplicate check. Participation rows are inserted
//! already linked to their ledger entry, so a cancel racing a spin never
//! sees an award it cannot revoke.

use chrono::Utc;
use fortuna_core::{
    models::{Participation, PointEntry},
    traits::{BudgetRepository, ParticipationRepository, PointRepository, UserRepository},
    AppError, AppResult,
};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::constants::{SPIN_MAX_POINTS, SPIN_MIN_POINTS};

/// Result of a winning spin
#[derive(Debug, Clone)]
pub struct SpinResult {
    /// The recorded participation
    pub participation: Participation,

    /// The ledger entry holding the award
    pub point_entry: PointEntry,

    /// Budget left for the rest of the day
    pub budget_remaining: i64,
}

/// Result of a participation cancel
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    /// The cancelled participation
    pub participation: Participation,

    /// Whether the award went back into today's budget
    pub budget_restored: bool,
}

/// Today's spin state for one user
#[derive(Debug, Clone)]
pub struct SpinStatus {
    /// Whether a participation row exists for today, cancelled or not
    pub has_participated_today: bool,

    /// Points awarded by today's spin, if one happened
    pub today_points: Option<i64>,

    /// Budget left for the rest of the day
    pub remaining_budget: i64,

    /// Total budget configured for today
    pub total_budget: i64,
}

/// One entry of a user's spin history
#[derive(Debug, Clone)]
pub struct SpinRecord {
    /// The participation row
    pub participation: Participation,

    /// Whether the award can still be revoked
    pub cancellable: bool,
}

/// Daily draw service
///
/// Handles spins and participation cancels with pessimistic row leases.
#[derive(Clone)]
pub struct SpinService {
    budgets: Arc<dyn BudgetRepository>,
    participations: Arc<dyn ParticipationRepository>,
    points: Arc<dyn PointRepository>,
    users: Arc<dyn UserRepository>,
}

impl SpinService {
    /// Create a new spin service
    pub fn new(
        budgets: Arc<dyn BudgetRepository>,
        participations: Arc<dyn ParticipationRepository>,
        points: Arc<dyn PointRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            budgets,
            participations,
            points,
            users,
        }
    }

    /// Roll the award for a spin
    ///
    /// Uniform over `[SPIN_MIN_POINTS, upper]`. The caller guarantees
    /// `upper >= SPIN_MIN_POINTS`.
    fn roll_award(upper: i64) -> i64 {
        if upper <= SPIN_MIN_POINTS {
            return SPIN_MIN_POINTS;
        }
        rand::thread_rng().gen_range(SPIN_MIN_POINTS..=upper)
    }

    /// Run one spin for a user
    ///
    /// # Arguments
    ///
    /// * `user_id` - The spinning user
    ///
    /// # Returns
    ///
    /// The participation, the granted ledger entry and the remaining budget
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The user does not exist
    /// - The user already has a participation today, cancelled or not
    /// - Today's budget cannot cover the minimum award
    /// - The budget row lease cannot be taken in time
    #[instrument(skip(self))]
    pub async fn spin(&self, user_id: i64) -> AppResult<SpinResult> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))?;

        let today = Utc::now().date_naive();

        // Fast fail without touching the budget lease
        if self
            .participations
            .find_by_user_and_date(user_id, today)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyParticipated);
        }

        // Serialize all of today's spins on the budget row
        let _budget_lease = self.budgets.lock(today).await?;

        // Re-check under the lease; another spin may have won the race
        if self
            .participations
            .find_by_user_and_date(user_id, today)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyParticipated);
        }

        let mut budget = self.budgets.find_or_create(today).await?;
        let upper = budget.calculate_distributable(SPIN_MAX_POINTS, SPIN_MIN_POINTS)?;
        let amount = Self::roll_award(upper);
        budget.distribute(amount)?;

        // Grant the points first so the participation row is born linked;
        // a concurrent cancel must never see a row without its entry
        let entry = self.points.create(&PointEntry::new(user_id, amount)).await?;

        let mut row = Participation::new(user_id, today, amount);
        row.point_entry_id = Some(entry.id);

        // Insert the participation; the unique index backstops the check above
        let participation = match self.participations.create(&row).await {
            Ok(p) => p,
            Err(e) => {
                // The grant has no owner; take it back out of the ledger
                let mut orphan = entry;
                orphan.cancel();
                self.points.update(&orphan).await?;
                return Err(match e {
                    AppError::AlreadyExists(_) => AppError::AlreadyParticipated,
                    other => other,
                });
            }
        };

        let budget = self.budgets.update(&budget).await?;

        info!(
            "User {} won {} points on {}; budget remaining {}",
            user_id,
            amount,
            today,
            budget.remaining()
        );

        Ok(SpinResult {
            participation,
            point_entry: entry,
            budget_remaining: budget.remaining(),
        })
    }

    /// Today's spin state for a user plus the day's budget
    ///
    /// Reads only; when no budget row exists yet the default view is
    /// reported without creating one.
    #[instrument(skip(self))]
    pub async fn status(&self, user_id: i64) -> AppResult<SpinStatus> {
        let today = Utc::now().date_naive();
        let participation = self
            .participations
            .find_by_user_and_date(user_id, today)
            .await?;
        let budget = self.budgets.find_or_default(today).await?;

        Ok(SpinStatus {
            has_participated_today: participation.is_some(),
            today_points: participation.map(|p| p.awarded_points),
            remaining_budget: budget.remaining(),
            total_budget: budget.total_budget,
        })
    }

    /// A user's past spins, newest first
    ///
    /// Each record carries whether the award can still be revoked: the
    /// participation stands and none of its points were spent.
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: i64) -> AppResult<Vec<SpinRecord>> {
        let rows = self.participations.find_by_user(user_id).await?;

        let mut records = Vec::with_capacity(rows.len());
        for participation in rows {
            let spent = match participation.point_entry_id {
                Some(entry_id) => self
                    .points
                    .find_by_id(entry_id)
                    .await?
                    .map(|e| e.used_amount > 0)
                    .unwrap_or(false),
                None => false,
            };
            let cancellable = participation.status.is_participated() && !spent;
            records.push(SpinRecord {
                participation,
                cancellable,
            });
        }
        Ok(records)
    }

    /// Cancel a participation and revoke its award
    ///
    /// The linked ledger entry is marked canceled and, when the
    /// participation is from today, the award flows back into today's
    /// budget. Awards from past days are gone for good; their budget day
    /// is closed.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The participation does not exist or is already cancelled
    /// - The row carries no ledger entry link (transient; retry)
    /// - Any of the awarded points were already spent
    /// - A row lease cannot be taken in time
    #[instrument(skip(self))]
    pub async fn cancel_participation(&self, participation_id: i64) -> AppResult<CancelOutcome> {
        let found = self
            .participations
            .find_by_id(participation_id)
            .await?
            .ok_or(AppError::ParticipationNotFound(participation_id))?;

        // Serialize against other cancels of the same slot
        let _slot_lease = self.participations.lock(found.user_id, found.date).await?;

        let mut participation = self
            .participations
            .find_by_id(participation_id)
            .await?
            .ok_or(AppError::ParticipationNotFound(participation_id))?;
        participation.cancel()?;

        // Hold the ledger while inspecting and revoking the entry
        let _ledger_lease = self.points.lock_user(participation.user_id).await?;

        // Spins insert rows already linked to their ledger entry; a missing
        // link is a half-visible write, not a row we can safely revoke
        let entry_id = participation.point_entry_id.ok_or_else(|| {
            AppError::Conflict(format!(
                "participation {participation_id} has no linked point entry"
            ))
        })?;
        let entry = self.points.find_by_id(entry_id).await?;
        if let Some(entry) = &entry {
            if entry.used_amount > 0 {
                warn!(
                    "Refusing to cancel participation {}: {} of {} points spent",
                    participation_id, entry.used_amount, entry.amount
                );
                return Err(AppError::PointsAlreadyUsed(participation_id));
            }
        }

        // All checks passed; apply the mutations
        if let Some(mut entry) = entry {
            entry.cancel();
            self.points.update(&entry).await?;
        }
        let participation = self.participations.update(&participation).await?;

        // The budget only takes the points back on the day they left it
        let today = Utc::now().date_naive();
        let mut budget_restored = false;
        if participation.date == today {
            let _budget_lease = self.budgets.lock(today).await?;
            if let Some(mut budget) = self.budgets.find_by_date(today).await? {
                budget.restore(participation.awarded_points)?;
                self.budgets.update(&budget).await?;
                budget_restored = true;
            }
        }

        info!(
            "Cancelled participation {} for user {}; budget restored: {}",
            participation_id, participation.user_id, budget_restored
        );

        Ok(CancelOutcome {
            participation,
            budget_restored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use fortuna_core::models::{ParticipationStatus, PointStatus, User};
    use fortuna_store::{
        MemBudgetRepository, MemParticipationRepository, MemPointRepository, MemStore,
        MemUserRepository, StoreSettings,
    };
    use std::time::Duration;

    fn store_with_budget(total: i64) -> Arc<MemStore> {
        Arc::new(MemStore::with_settings(StoreSettings {
            lock_wait: Duration::from_secs(5),
            daily_budget_total: total,
        }))
    }

    fn build(store: &Arc<MemStore>) -> SpinService {
        SpinService::new(
            Arc::new(MemBudgetRepository::new(store.clone())),
            Arc::new(MemParticipationRepository::new(store.clone())),
            Arc::new(MemPointRepository::new(store.clone())),
            Arc::new(MemUserRepository::new(store.clone())),
        )
    }

    async fn add_user(store: &Arc<MemStore>, name: &str) -> i64 {
        MemUserRepository::new(store.clone())
            .create(&User::new(name.to_string()))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_spin_awards_within_range() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();

        let amount = result.participation.awarded_points;
        assert!((100..=1000).contains(&amount));
        assert_eq!(result.point_entry.amount, amount);
        assert_eq!(
            result.participation.point_entry_id,
            Some(result.point_entry.id)
        );
        assert_eq!(result.budget_remaining, 100_000 - amount);
        assert_eq!(result.participation.status, ParticipationStatus::Participated);
    }

    #[tokio::test]
    async fn test_second_spin_same_day_rejected() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        service.spin(user_id).await.unwrap();

        let err = service.spin(user_id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyParticipated));
    }

    #[tokio::test]
    async fn test_spin_unknown_user_rejected() {
        let store = store_with_budget(100_000);
        let service = build(&store);

        let err = service.spin(999).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(999)));
    }

    #[tokio::test]
    async fn test_budget_exhaustion() {
        // Budget of 150 covers exactly one award
        let store = store_with_budget(150);
        let service = build(&store);
        let first = add_user(&store, "first").await;
        let second = add_user(&store, "second").await;

        let result = service.spin(first).await.unwrap();
        assert!((100..=150).contains(&result.participation.awarded_points));

        let err = service.spin(second).await.unwrap_err();
        assert!(matches!(err, AppError::BudgetExhausted { .. }));
    }

    #[tokio::test]
    async fn test_award_clamped_by_remaining_budget() {
        // First award lands in [100, 120], leaving less than a full roll
        let store = store_with_budget(120);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();
        assert!(result.participation.awarded_points <= 120);
        assert!(result.budget_remaining >= 0);
    }

    #[tokio::test]
    async fn test_cancel_restores_budget_and_revokes_entry() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();
        let outcome = service
            .cancel_participation(result.participation.id)
            .await
            .unwrap();

        assert!(outcome.budget_restored);
        assert_eq!(outcome.participation.status, ParticipationStatus::Cancelled);

        let budgets = MemBudgetRepository::new(store.clone());
        let budget = budgets
            .find_by_date(Utc::now().date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(budget.used_budget, 0);

        let points = MemPointRepository::new(store.clone());
        let entry = points
            .find_by_id(result.point_entry.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.status, PointStatus::Canceled);
    }

    #[tokio::test]
    async fn test_cancelled_participation_blocks_respin() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();
        service
            .cancel_participation(result.participation.id)
            .await
            .unwrap();

        let err = service.spin(user_id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyParticipated));
    }

    #[tokio::test]
    async fn test_cancel_with_spent_points_rejected() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();

        // Spend part of the award
        let points = MemPointRepository::new(store.clone());
        let mut entry = points
            .find_by_id(result.point_entry.id)
            .await
            .unwrap()
            .unwrap();
        entry.consume(10);
        points.update(&entry).await.unwrap();

        let err = service
            .cancel_participation(result.participation.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PointsAlreadyUsed(_)));

        // Nothing was rolled back
        let reloaded = points
            .find_by_id(result.point_entry.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.status, PointStatus::Earned);
    }

    #[tokio::test]
    async fn test_cancel_past_participation_skips_budget_restore() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;
        let yesterday = Utc::now().date_naive() - ChronoDuration::days(1);

        // Seed a participation from yesterday with its granted entry
        let participations = MemParticipationRepository::new(store.clone());
        let points = MemPointRepository::new(store.clone());
        let entry = points.create(&PointEntry::new(user_id, 500)).await.unwrap();
        let mut row = participations
            .create(&Participation::new(user_id, yesterday, 500))
            .await
            .unwrap();
        row.point_entry_id = Some(entry.id);
        participations.update(&row).await.unwrap();

        let outcome = service.cancel_participation(row.id).await.unwrap();
        assert!(!outcome.budget_restored);
        assert_eq!(outcome.participation.status, ParticipationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_double_cancel_rejected() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();
        service
            .cancel_participation(result.participation.id)
            .await
            .unwrap();

        let err = service
            .cancel_participation(result.participation.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ParticipationAlreadyCancelled(_)));
    }

    #[tokio::test]
    async fn test_cancel_unknown_participation() {
        let store = store_with_budget(100_000);
        let service = build(&store);

        let err = service.cancel_participation(999).await.unwrap_err();
        assert!(matches!(err, AppError::ParticipationNotFound(999)));
    }

    #[tokio::test]
    async fn test_spin_inserts_row_already_linked() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();

        // The stored row carries the link from its first visible moment
        let participations = MemParticipationRepository::new(store.clone());
        let row = participations
            .find_by_id(result.participation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.point_entry_id, Some(result.point_entry.id));
    }

    #[tokio::test]
    async fn test_cancel_unlinked_row_is_transient_conflict() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;
        let today = Utc::now().date_naive();

        // A row without its ledger entry link must not be cancellable
        let participations = MemParticipationRepository::new(store.clone());
        let row = participations
            .create(&Participation::new(user_id, today, 500))
            .await
            .unwrap();

        let err = service.cancel_participation(row.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(err.is_transient());

        // Nothing was touched: the row stands and no budget moved
        let reloaded = participations.find_by_id(row.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ParticipationStatus::Participated);

        let budgets = MemBudgetRepository::new(store.clone());
        assert!(budgets.find_by_date(today).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_before_and_after_spin() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let before = service.status(user_id).await.unwrap();
        assert!(!before.has_participated_today);
        assert_eq!(before.today_points, None);
        assert_eq!(before.total_budget, 100_000);
        assert_eq!(before.remaining_budget, 100_000);

        let result = service.spin(user_id).await.unwrap();
        let award = result.participation.awarded_points;

        let after = service.status(user_id).await.unwrap();
        assert!(after.has_participated_today);
        assert_eq!(after.today_points, Some(award));
        assert_eq!(after.remaining_budget, 100_000 - award);
    }

    #[tokio::test]
    async fn test_history_tracks_cancellability() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        assert!(service.history(user_id).await.unwrap().is_empty());

        let result = service.spin(user_id).await.unwrap();

        let history = service.history(user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].cancellable);

        // Spending any of the award pins the participation in place
        let points = MemPointRepository::new(store.clone());
        let mut entry = points
            .find_by_id(result.point_entry.id)
            .await
            .unwrap()
            .unwrap();
        entry.consume(10);
        points.update(&entry).await.unwrap();

        let history = service.history(user_id).await.unwrap();
        assert!(!history[0].cancellable);
    }

    #[tokio::test]
    async fn test_cancelled_entry_not_cancellable_again() {
        let store = store_with_budget(100_000);
        let service = build(&store);
        let user_id = add_user(&store, "player").await;

        let result = service.spin(user_id).await.unwrap();
        service
            .cancel_participation(result.participation.id)
            .await
            .unwrap();

        let history = service.history(user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].participation.status,
            ParticipationStatus::Cancelled
        );
        assert!(!history[0].cancellable);
    }

    #[test]
    fn test_roll_award_bounds() {
        assert_eq!(SpinService::roll_award(SPIN_MIN_POINTS), SPIN_MIN_POINTS);

        for _ in 0..200 {
            let award = SpinService::roll_award(SPIN_MAX_POINTS);
            assert!((SPIN_MIN_POINTS..=SPIN_MAX_POINTS).contains(&award));
        }
        for _ in 0..200 {
            let award = SpinService::roll_award(137);
            assert!((SPIN_MIN_POINTS..=137).contains(&award));
        }
    }
}
