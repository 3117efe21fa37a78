//! Daily draw participation model

use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationStatus {
    /// The draw result stands and the awarded points were granted
    #[default]
    Participated,
    /// The participation was cancelled and its points revoked
    Cancelled,
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipationStatus::Participated => write!(f, "PARTICIPATED"),
            ParticipationStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl ParticipationStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PARTICIPATED" => Some(ParticipationStatus::Participated),
            "CANCELLED" => Some(ParticipationStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the participation still stands
    pub fn is_participated(&self) -> bool {
        matches!(self, ParticipationStatus::Participated)
    }
}

/// Daily draw participation entity
///
/// One row per user per day, created when a spin succeeds. The
/// `(user_id, date)` pair stays unique even after cancellation, which is
/// what makes a cancelled participation still count as "already played
/// today".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    /// Unique identifier
    pub id: i64,

    /// The user who spun
    pub user_id: i64,

    /// The calendar day of the spin
    pub date: NaiveDate,

    /// Points awarded by the spin
    pub awarded_points: i64,

    /// Current status
    pub status: ParticipationStatus,

    /// The ledger entry holding the awarded points
    pub point_entry_id: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Cancellation timestamp, set exactly once
    pub cancelled_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Participation {
    /// Create a new participation for a winning spin
    pub fn new(user_id: i64, date: NaiveDate, awarded_points: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            date,
            awarded_points,
            status: ParticipationStatus::Participated,
            point_entry_id: None,
            created_at: now,
            cancelled_at: None,
            updated_at: now,
        }
    }

    /// Cancel this participation and stamp the cancellation time
    ///
    /// # Errors
    ///
    /// Returns `AppError::ParticipationAlreadyCancelled` if it was
    /// cancelled before.
    pub fn cancel(&mut self) -> Result<(), AppError> {
        if self.status == ParticipationStatus::Cancelled {
            return Err(AppError::ParticipationAlreadyCancelled(self.id));
        }
        let now = Utc::now();
        self.status = ParticipationStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}
