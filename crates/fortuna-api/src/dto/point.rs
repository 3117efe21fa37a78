//! Point ledger DTOs

use chrono::{DateTime, Utc};
use fortuna_core::models::PointEntry;
use fortuna_services::BalanceSummary;
use serde::Serialize;

/// One ledger entry as shown to the user
///
/// `status` is the effective status, so an entry past its expiry reads
/// EXPIRED even though storage still says EARNED.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEntryResponse {
    /// Entry ID
    pub id: i64,

    /// Points granted by this entry
    pub amount: i64,

    /// Portion already spent
    pub used_amount: i64,

    /// Portion still spendable
    pub available_amount: i64,

    /// EARNED, EXPIRED or CANCELED
    pub status: String,

    /// When the points were granted
    pub earned_at: DateTime<Utc>,

    /// When the unspent remainder stops counting
    pub expires_at: DateTime<Utc>,
}

impl From<PointEntry> for PointEntryResponse {
    fn from(entry: PointEntry) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
            used_amount: entry.used_amount,
            available_amount: entry.available(),
            status: entry.effective_status().to_string(),
            earned_at: entry.earned_at,
            expires_at: entry.expires_at,
        }
    }
}

/// Balance summary response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Total spendable points
    pub total_balance: i64,

    /// Portion of the balance expiring within 7 days
    pub expiring_within_7_days: i64,
}

impl From<BalanceSummary> for BalanceResponse {
    fn from(summary: BalanceSummary) -> Self {
        Self {
            total_balance: summary.available,
            expiring_within_7_days: summary.expiring_soon,
        }
    }
}
