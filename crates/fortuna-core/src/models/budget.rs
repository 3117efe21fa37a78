//! Daily point budget model
//!
//! Each calendar day has a single budget row that bounds the total number
//! of points the draw may hand out on that day.

use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily budget entity
///
/// One row per calendar day. `used_budget` only moves through [`distribute`]
/// and [`restore`], so `0 <= used_budget <= total_budget` holds at all times.
///
/// [`distribute`]: DailyBudget::distribute
/// [`restore`]: DailyBudget::restore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBudget {
    /// Unique identifier
    pub id: i64,

    /// The calendar day this budget covers
    pub date: NaiveDate,

    /// Total points distributable on this day
    pub total_budget: i64,

    /// Points already handed out
    pub used_budget: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl DailyBudget {
    /// Default daily budget in points
    pub const DEFAULT_TOTAL: i64 = 100_000;

    /// Create a new budget row for a day
    pub fn new(date: NaiveDate, total_budget: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            date,
            total_budget,
            used_budget: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Points still distributable today
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.total_budget - self.used_budget
    }

    /// Decide how many points the next winner may receive
    ///
    /// Returns the upper bound for the award roll: the requested maximum,
    /// clamped down to what the budget still holds. Fails once the
    /// remainder cannot cover even the minimum award.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BudgetExhausted` if `remaining() < min_amount`.
    pub fn calculate_distributable(&self, max_amount: i64, min_amount: i64) -> Result<i64, AppError> {
        let remaining = self.remaining();
        if remaining < min_amount {
            return Err(AppError::BudgetExhausted {
                requested: min_amount,
                remaining,
            });
        }
        Ok(max_amount.min(remaining))
    }

    /// Consume part of the budget
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if `amount <= 0`, and
    /// `AppError::BudgetExhausted` if `amount` exceeds the remainder.
    pub fn distribute(&mut self, amount: i64) -> Result<(), AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "distribute amount must be positive, got {amount}"
            )));
        }
        let remaining = self.remaining();
        if amount > remaining {
            return Err(AppError::BudgetExhausted {
                requested: amount,
                remaining,
            });
        }
        self.used_budget += amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return previously distributed points to the budget
    ///
    /// Restoring more than was used floors `used_budget` at zero rather
    /// than failing, so a restore can never push the budget negative.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if `amount <= 0`.
    pub fn restore(&mut self, amount: i64) -> Result<(), AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "restore amount must be positive, got {amount}"
            )));
        }
        self.used_budget = (self.used_budget - amount).max(0);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Change the total budget for this day
    ///
    /// The new total may equal the amount already used but never fall
    /// below it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if `new_total < 0` or
    /// `new_total < used_budget`.
    pub fn set_total(&mut self, new_total: i64) -> Result<(), AppError> {
        if new_total < 0 {
            return Err(AppError::InvalidArgument(format!(
                "total budget must not be negative, got {new_total}"
            )));
        }
        if new_total < self.used_budget {
            return Err(AppError::InvalidArgument(format!(
                "total budget {new_total} is below the {} points already used",
                self.used_budget
            )));
        }
        self.total_budget = new_total;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_new_budget() {
        let budget = DailyBudget::new(day(), DailyBudget::DEFAULT_TOTAL);
        assert_eq!(budget.total_budget, 100_000);
        assert_eq!(budget.used_budget, 0);
        assert_eq!(budget.remaining(), 100_000);
    }

    #[test]
    fn test_calculate_distributable_clamps_to_remaining() {
        let mut budget = DailyBudget::new(day(), 1000);
        budget.used_budget = 500;

        assert_eq!(budget.calculate_distributable(1000, 100).unwrap(), 500);
        assert_eq!(budget.calculate_distributable(300, 100).unwrap(), 300);
    }

    #[test]
    fn test_calculate_distributable_exhausted() {
        let mut budget = DailyBudget::new(day(), 1000);
        budget.used_budget = 950;

        let err = budget.calculate_distributable(1000, 100).unwrap_err();
        assert!(matches!(
            err,
            AppError::BudgetExhausted {
                requested: 100,
                remaining: 50
            }
        ));
    }

    #[test]
    fn test_distribute() {
        let mut budget = DailyBudget::new(day(), 1000);

        budget.distribute(400).unwrap();
        assert_eq!(budget.used_budget, 400);
        assert_eq!(budget.remaining(), 600);

        budget.distribute(600).unwrap();
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_distribute_over_remaining_fails() {
        let mut budget = DailyBudget::new(day(), 1000);
        budget.distribute(901).unwrap();

        let err = budget.distribute(100).unwrap_err();
        assert!(matches!(err, AppError::BudgetExhausted { .. }));
        assert_eq!(budget.used_budget, 901);
    }

    #[test]
    fn test_distribute_rejects_non_positive() {
        let mut budget = DailyBudget::new(day(), 1000);
        assert!(matches!(
            budget.distribute(0),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            budget.distribute(-5),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_restore_floors_at_zero() {
        let mut budget = DailyBudget::new(day(), 1000);
        budget.distribute(300).unwrap();

        budget.restore(500).unwrap();
        assert_eq!(budget.used_budget, 0);
    }

    #[test]
    fn test_set_total_below_used_rejected() {
        let mut budget = DailyBudget::new(day(), 1000);
        budget.distribute(600).unwrap();

        assert!(matches!(
            budget.set_total(599),
            Err(AppError::InvalidArgument(_))
        ));

        // Equal to used is allowed
        budget.set_total(600).unwrap();
        assert_eq!(budget.remaining(), 0);
    }

    proptest! {
        #[test]
        fn distribute_and_restore_keep_invariants(
            total in 0_i64..1_000_000,
            ops in proptest::collection::vec((any::<bool>(), 1_i64..5_000), 0..64),
        ) {
            let mut budget = DailyBudget::new(day(), total);
            for (is_distribute, amount) in ops {
                if is_distribute {
                    let _ = budget.distribute(amount);
                } else {
                    let _ = budget.restore(amount);
                }
                prop_assert!(budget.used_budget >= 0);
                prop_assert!(budget.used_budget <= budget.total_budget);
                prop_assert_eq!(budget.remaining(), budget.total_budget - budget.used_budget);
            }
        }

        #[test]
        fn distributable_is_within_bounds(
            total in 100_i64..1_000_000,
            used in 0_i64..1_000_000,
        ) {
            let mut budget = DailyBudget::new(day(), total);
            budget.used_budget = used.min(total);

            match budget.calculate_distributable(1000, 100) {
                Ok(amount) => {
                    prop_assert!(amount >= 100);
                    prop_assert!(amount <= 1000);
                    prop_assert!(amount <= budget.remaining());
                }
                Err(_) => prop_assert!(budget.remaining() < 100),
            }
        }
    }
}
