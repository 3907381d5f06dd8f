use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Admin-declared interval during which viewings may be scheduled.
/// Windows in the scheduling scope must not overlap each other.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub created_by: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    pub fn new(start_at: DateTime<Utc>, end_at: DateTime<Utc>, created_by: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_at,
            end_at,
            created_by,
            active: true,
            created_at: Utc::now(),
        }
    }
}
