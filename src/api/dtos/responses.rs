use serde::Serialize;

use crate::domain::models::slot::Slot;
use crate::domain::models::window::AvailabilityWindow;

/// `version` is the sum of all slot versions. Every reservation or release
/// bumps one slot's version, so a changed value tells a polling client its
/// last listing is stale.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotListResponse {
    pub version: i64,
    pub slots: Vec<Slot>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMaterializedResponse {
    pub window: AvailabilityWindow,
    pub slots_created: u64,
    pub slots_removed: u64,
}
