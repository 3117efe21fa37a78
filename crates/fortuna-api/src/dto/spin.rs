//! Daily draw DTOs

use chrono::{DateTime, NaiveDate, Utc};
use fortuna_services::{SpinRecord, SpinResult, SpinStatus};
use serde::Serialize;

/// Spin result response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResponse {
    /// Points awarded by this spin
    pub points: i64,

    /// Budget left for the rest of the day
    pub remaining_budget: i64,

    /// Human-readable win message
    pub message: String,
}

impl From<SpinResult> for SpinResponse {
    fn from(result: SpinResult) -> Self {
        let points = result.participation.awarded_points;
        Self {
            points,
            remaining_budget: result.budget_remaining,
            message: format!("Congratulations! You won {points} points"),
        }
    }
}

/// Today's spin state response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinStatusResponse {
    /// Whether today's spin already happened, cancelled or not
    pub has_participated_today: bool,

    /// Points awarded today, if a spin happened
    pub today_points: Option<i64>,

    /// Budget left for the rest of the day
    pub remaining_budget: i64,

    /// Total budget configured for today
    pub total_budget: i64,
}

impl From<SpinStatus> for SpinStatusResponse {
    fn from(status: SpinStatus) -> Self {
        Self {
            has_participated_today: status.has_participated_today,
            today_points: status.today_points,
            remaining_budget: status.remaining_budget,
            total_budget: status.total_budget,
        }
    }
}

/// One entry of a user's spin history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinHistoryResponse {
    /// Participation ID
    pub id: i64,

    /// The day of the spin
    pub date: NaiveDate,

    /// Points awarded
    pub points: i64,

    /// PARTICIPATED or CANCELLED
    pub status: String,

    /// Whether the award can still be revoked
    pub cancellable: bool,

    /// When the spin happened
    pub created_at: DateTime<Utc>,

    /// When the participation was cancelled, if it was
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<SpinRecord> for SpinHistoryResponse {
    fn from(record: SpinRecord) -> Self {
        let p = record.participation;
        Self {
            id: p.id,
            date: p.date,
            points: p.awarded_points,
            status: p.status.to_string(),
            cancellable: record.cancellable,
            created_at: p.created_at,
            cancelled_at: p.cancelled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortuna_core::models::{Participation, PointEntry};

    #[test]
    fn test_spin_response_from_result() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let result = SpinResult {
            participation: Participation::new(7, date, 450),
            point_entry: PointEntry::new(7, 450),
            budget_remaining: 99_550,
        };

        let resp = SpinResponse::from(result);
        assert_eq!(resp.points, 450);
        assert_eq!(resp.remaining_budget, 99_550);
        assert!(resp.message.contains("450"));
    }

    #[test]
    fn test_history_response_carries_status() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut participation = Participation::new(7, date, 450);
        participation.cancel().unwrap();

        let resp = SpinHistoryResponse::from(SpinRecord {
            participation,
            cancellable: false,
        });
        assert_eq!(resp.status, "CANCELLED");
        assert!(!resp.cancellable);
        assert!(resp.cancelled_at.is_some());
    }
}
