use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use std::fmt;
use std::str::FromStr;

use crate::domain::models::slot::Slot;

/// Closed booking lifecycle. Unknown strings are rejected at the API
/// boundary by serde; the persisted TEXT column only ever holds values
/// written through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    OnSite,
    Cancelled,
    Completed,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::OnSite => "ON_SITE",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Expired => "EXPIRED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed | BookingStatus::Expired)
    }

    /// Statuses that hold a slot. At most one booking per slot may carry one
    /// of these at any time.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::OnSite)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "ON_SITE" => Ok(BookingStatus::OnSite),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            "EXPIRED" => Ok(BookingStatus::Expired),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

/// A user's reservation of a slot. Bookings are never hard-deleted; they
/// move through terminal states so the audit trail survives slot and window
/// removal. `slot_start_at` is denormalized from the slot at creation time
/// for the same reason, and drives the lead-time, elapsed-cancel and expiry
/// checks without a join.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub slot_id: String,
    pub slot_start_at: DateTime<Utc>,
    pub requester_user_id: String,
    pub address: Option<String>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(requester_user_id: &str, slot: &Slot, address: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            slot_id: slot.id.clone(),
            slot_start_at: slot.start_at,
            requester_user_id: requester_user_id.to_string(),
            address,
            status: BookingStatus::Pending.as_str().to_string(),
            cancellation_reason: None,
            requested_at: now,
            status_updated_at: now,
        }
    }

    pub fn parsed_status(&self) -> Result<BookingStatus, crate::error::AppError> {
        self.status.parse().map_err(|_| crate::error::AppError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::OnSite,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
            BookingStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("ACCEPTED".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_active_and_terminal_partition() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::OnSite.is_active());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Expired.is_terminal());
        assert!(!BookingStatus::OnSite.is_terminal());
    }
}
