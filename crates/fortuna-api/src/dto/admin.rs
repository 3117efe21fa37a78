//! Admin console DTOs

use chrono::{DateTime, NaiveDate, Utc};
use fortuna_core::models::DailyBudget;
use fortuna_services::{CancelOutcome, DashboardSummary, ParticipationView};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Dashboard response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// The day being summarized
    pub date: NaiveDate,

    /// Today's budget total
    pub total_budget: i64,

    /// Points handed out today
    pub used_budget: i64,

    /// Points still distributable today
    pub remaining_budget: i64,

    /// Users whose spin stands today
    pub participants_today: i64,

    /// Points currently awarded for today
    pub points_awarded_today: i64,

    /// Completed orders placed today
    pub orders_today: i64,

    /// Products currently listed in the shop
    pub product_count: i64,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            date: summary.date,
            total_budget: summary.total_budget,
            used_budget: summary.used_budget,
            remaining_budget: summary.remaining_budget,
            participants_today: summary.participants_today,
            points_awarded_today: summary.points_awarded_today,
            orders_today: summary.orders_today,
            product_count: summary.product_count,
        }
    }
}

/// Budget view response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    /// The calendar day this budget covers
    pub date: NaiveDate,

    /// Total points distributable on this day
    pub total_budget: i64,

    /// Points already handed out
    pub used_budget: i64,

    /// Points still distributable
    pub remaining_budget: i64,
}

impl From<DailyBudget> for BudgetResponse {
    fn from(budget: DailyBudget) -> Self {
        Self {
            date: budget.date,
            total_budget: budget.total_budget,
            used_budget: budget.used_budget,
            remaining_budget: budget.remaining(),
        }
    }
}

/// Budget update request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdateRequest {
    /// New total for today; may not fall below what was already handed out
    #[validate(range(min = 0, message = "Budget must not be negative"))]
    pub total_budget: i64,
}

/// One of today's participations with the user's name resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminParticipationResponse {
    /// Participation ID
    pub id: i64,

    /// The participating user
    pub user_id: i64,

    /// The user's name, when the user still exists
    pub username: Option<String>,

    /// Points awarded
    pub points: i64,

    /// PARTICIPATED or CANCELLED
    pub status: String,

    /// When the spin happened
    pub created_at: DateTime<Utc>,

    /// When the participation was cancelled, if it was
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<ParticipationView> for AdminParticipationResponse {
    fn from(view: ParticipationView) -> Self {
        let p = view.participation;
        Self {
            id: p.id,
            user_id: p.user_id,
            username: view.username,
            points: p.awarded_points,
            status: p.status.to_string(),
            created_at: p.created_at,
            cancelled_at: p.cancelled_at,
        }
    }
}

/// Participation cancellation response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelParticipationResponse {
    /// The cancelled participation
    pub participation_id: i64,

    /// Points revoked by the cancel
    pub cancelled_points: i64,

    /// Whether the award went back into today's budget
    pub budget_restored: bool,
}

impl From<CancelOutcome> for CancelParticipationResponse {
    fn from(outcome: CancelOutcome) -> Self {
        Self {
            participation_id: outcome.participation.id,
            cancelled_points: outcome.participation.awarded_points,
            budget_restored: outcome.budget_restored,
        }
    }
}
