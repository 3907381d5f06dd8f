use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::models::booking::BookingStatus;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWindowRequest {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWindowRequest {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ListWindowsParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct DeleteWindowParams {
    pub cascade: Option<bool>,
}

/// Optional bounds on the free-slot listing. `from` never reaches into the
/// past; slots are bookable from now on regardless of what the client asks.
#[derive(Deserialize)]
pub struct SlotRangeParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub slot_id: String,
    pub address: Option<String>,
}

/// Status comes in as a closed enum: an unknown value fails query
/// deserialization before any handler code runs.
#[derive(Deserialize)]
pub struct StatusUpdateParams {
    pub status: BookingStatus,
    pub address: Option<String>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusFilterParams {
    pub status: BookingStatus,
}
