//! Point ledger model
//!
//! Points are tracked as individual earn entries rather than one balance
//! counter. Spending walks entries oldest-first and records how much of
//! each entry is gone, which keeps expiry and refunds exact.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored point entry status
///
/// Expiry never flips this field; it is derived on read as
/// [`EffectivePointStatus`], which is why no expired variant exists here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointStatus {
    /// Entry is granted and may be spent until it expires
    #[default]
    Earned,
    /// Entry was revoked by a participation cancel
    Canceled,
}

impl fmt::Display for PointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointStatus::Earned => write!(f, "EARNED"),
            PointStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

impl PointStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EARNED" => Some(PointStatus::Earned),
            "CANCELED" => Some(PointStatus::Canceled),
            _ => None,
        }
    }
}

/// Point entry status as callers see it
///
/// Computed from the stored status and the clock; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectivePointStatus {
    /// Entry may still be spent
    Earned,
    /// Entry passed its expiry date with points left unspent
    Expired,
    /// Entry was revoked by a participation cancel
    Canceled,
}

impl fmt::Display for EffectivePointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectivePointStatus::Earned => write!(f, "EARNED"),
            EffectivePointStatus::Expired => write!(f, "EXPIRED"),
            EffectivePointStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Point ledger entry entity
///
/// The stored `status` is only ever `Earned` or `Canceled`; expiry is
/// evaluated on read via [`effective_status`], so no sweeper job is
/// needed to flip rows.
///
/// [`effective_status`]: PointEntry::effective_status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointEntry {
    /// Unique identifier
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Points granted by this entry
    pub amount: i64,

    /// Portion of `amount` already spent
    pub used_amount: i64,

    /// Stored status (`Earned` or `Canceled`)
    pub status: PointStatus,

    /// When the points were granted
    pub earned_at: DateTime<Utc>,

    /// When the unspent remainder stops counting
    pub expires_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl PointEntry {
    /// Days until a fresh entry expires
    pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

    /// Create a new earn entry with the default expiry window
    pub fn new(user_id: i64, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            amount,
            used_amount: 0,
            status: PointStatus::Earned,
            earned_at: now,
            expires_at: now + Duration::days(Self::DEFAULT_EXPIRY_DAYS),
            updated_at: now,
        }
    }

    /// Unspent points in this entry
    #[inline]
    pub fn available(&self) -> i64 {
        self.amount - self.used_amount
    }

    /// Check if the entry is past its expiry date
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Status as seen by callers
    ///
    /// Cancellation dominates expiry: a canceled entry stays `Canceled`
    /// no matter how old it is.
    pub fn effective_status(&self) -> EffectivePointStatus {
        if self.status == PointStatus::Canceled {
            EffectivePointStatus::Canceled
        } else if self.is_expired() {
            EffectivePointStatus::Expired
        } else {
            EffectivePointStatus::Earned
        }
    }

    /// Check if this entry can contribute to a spend
    pub fn is_usable(&self) -> bool {
        self.effective_status() == EffectivePointStatus::Earned && self.available() > 0
    }

    /// Spend up to `requested` points from this entry
    ///
    /// Consumes whatever the entry still has, capped at the request, and
    /// returns the amount actually taken. A non-positive request takes
    /// nothing.
    pub fn consume(&mut self, requested: i64) -> i64 {
        if requested <= 0 {
            return 0;
        }
        let taken = requested.min(self.available());
        self.used_amount += taken;
        self.updated_at = Utc::now();
        taken
    }

    /// Revoke this entry
    pub fn cancel(&mut self) {
        self.status = PointStatus::Canceled;
        self.updated_at = Utc::now();
    }
}
