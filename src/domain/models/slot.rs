use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const SLOT_FREE: &str = "FREE";
pub const SLOT_RESERVED: &str = "RESERVED";

/// A discrete, individually bookable sub-interval of an availability window.
/// Identity is derived from `(window_id, start_at)`, so materializing the
/// same window twice yields the same slot rows.
///
/// `version` increments on every status flip; the sum over all slots is the
/// freshness token exposed on slot listings.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub window_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String,
    pub version: i64,
}

impl Slot {
    pub fn is_free(&self) -> bool {
        self.status == SLOT_FREE
    }
}
