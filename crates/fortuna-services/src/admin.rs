//! Admin console service
//!
//! Budget management and operational summaries for the back office.
//! Cancels of participations and orders go through the domain services;
//! this one only reads widely and edits the budget.

use chrono::{NaiveDate, Utc};
use fortuna_core::{
    models::{DailyBudget, Order, Participation, ProductStatus},
    traits::{
        BudgetRepository, OrderRepository, ParticipationRepository, ProductRepository,
        UserRepository,
    },
    AppResult,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// One-screen summary of today's activity
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    /// The day being summarized
    pub date: NaiveDate,

    /// Today's budget total
    pub total_budget: i64,

    /// Points handed out today
    pub used_budget: i64,

    /// Points still distributable today
    pub remaining_budget: i64,

    /// Users whose spin stands today (cancelled spins excluded)
    pub participants_today: i64,

    /// Points currently awarded for today (cancelled spins excluded)
    pub points_awarded_today: i64,

    /// Completed orders placed today
    pub orders_today: i64,

    /// Products currently listed in the shop
    pub product_count: i64,
}

/// One participation row with its user's name resolved
#[derive(Debug, Clone)]
pub struct ParticipationView {
    /// The participation row
    pub participation: Participation,

    /// The participant's name, when the user still exists
    pub username: Option<String>,
}

/// Admin console service
#[derive(Clone)]
pub struct AdminService {
    budgets: Arc<dyn BudgetRepository>,
    participations: Arc<dyn ParticipationRepository>,
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
}

impl AdminService {
    /// Create a new admin service
    pub fn new(
        budgets: Arc<dyn BudgetRepository>,
        participations: Arc<dyn ParticipationRepository>,
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            budgets,
            participations,
            orders,
            products,
            users,
        }
    }

    /// Summarize today's draw and shop activity
    ///
    /// Participation and order counts are scoped to the current day;
    /// cancelled rows and other days' orders do not show up. The product
    /// count is the catalog's active listing, day-independent.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> AppResult<DashboardSummary> {
        let today = Utc::now().date_naive();
        let budget = self.budgets.find_or_default(today).await?;

        let participations = self.participations.find_by_date(today).await?;
        let participants_today = participations
            .iter()
            .filter(|p| p.status.is_participated())
            .count() as i64;
        let points_awarded_today = participations
            .iter()
            .filter(|p| p.status.is_participated())
            .map(|p| p.awarded_points)
            .sum();

        let orders = self.orders.find_all().await?;
        let orders_today = orders
            .iter()
            .filter(|o| o.created_at.date_naive() == today && o.status.is_completed())
            .count() as i64;

        let product_count = self
            .products
            .find_all()
            .await?
            .iter()
            .filter(|p| p.status == ProductStatus::Available)
            .count() as i64;

        Ok(DashboardSummary {
            date: today,
            total_budget: budget.total_budget,
            used_budget: budget.used_budget,
            remaining_budget: budget.remaining(),
            participants_today,
            points_awarded_today,
            orders_today,
            product_count,
        })
    }

    /// Read a day's budget without creating its row
    #[instrument(skip(self))]
    pub async fn budget_view(&self, date: NaiveDate) -> AppResult<DailyBudget> {
        self.budgets.find_or_default(date).await
    }

    /// Change a day's budget total
    ///
    /// Creates the row on first write. The new total may not fall below
    /// what that day has already handed out.
    ///
    /// # Errors
    ///
    /// Returns error if the total is invalid or the budget lease cannot
    /// be taken in time.
    #[instrument(skip(self))]
    pub async fn set_budget_total(&self, date: NaiveDate, new_total: i64) -> AppResult<DailyBudget> {
        let _budget_lease = self.budgets.lock(date).await?;

        let mut budget = self.budgets.find_or_create(date).await?;
        budget.set_total(new_total)?;
        let budget = self.budgets.update(&budget).await?;

        info!("Budget for {} set to {}", date, new_total);
        Ok(budget)
    }

    /// Today's participations with their users' names, newest first
    ///
    /// Cancelled rows are included so the console shows what was undone.
    #[instrument(skip(self))]
    pub async fn list_participations(&self) -> AppResult<Vec<ParticipationView>> {
        let today = Utc::now().date_naive();
        let rows = self.participations.find_by_date(today).await?;

        let mut views = Vec::with_capacity(rows.len());
        for participation in rows {
            let username = self
                .users
                .find_by_id(participation.user_id)
                .await?
                .map(|u| u.username);
            views.push(ParticipationView {
                participation,
                username,
            });
        }
        Ok(views)
    }

    /// List every order, newest first
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        self.orders.find_all().await
    }
}
