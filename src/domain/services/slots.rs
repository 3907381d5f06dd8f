use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::models::slot::{Slot, SLOT_FREE};
use crate::domain::models::window::AvailabilityWindow;

/// Namespace for deriving slot ids. A slot's id is the UUIDv5 of
/// `(window_id, start_at)` under this namespace, so the same window always
/// materializes into rows with the same identity.
const SLOT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b1a_9c4e_7d25_4f0b_9e6a_31c8_d05f_42e7);

pub fn slot_id(window_id: &str, start_at: DateTime<Utc>) -> String {
    let key = format!("{}|{}", window_id, start_at.timestamp());
    Uuid::new_v5(&SLOT_ID_NAMESPACE, key.as_bytes()).to_string()
}

/// Partitions `[start_at, end_at)` into consecutive slots of fixed duration.
/// A trailing remainder shorter than the duration is dropped. Pure and
/// deterministic: re-running it yields the identical slot set.
pub fn materialize_slots(window: &AvailabilityWindow, slot_duration_min: i64) -> Vec<Slot> {
    let mut slots = Vec::new();
    if slot_duration_min <= 0 {
        return slots;
    }

    let step = Duration::minutes(slot_duration_min);
    let mut cursor = window.start_at;

    while cursor + step <= window.end_at {
        slots.push(Slot {
            id: slot_id(&window.id, cursor),
            window_id: window.id.clone(),
            start_at: cursor,
            end_at: cursor + step,
            status: SLOT_FREE.to_string(),
            version: 0,
        });
        cursor += step;
    }

    slots
}
