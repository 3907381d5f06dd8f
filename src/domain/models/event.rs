use serde::Serialize;

/// Events handed to the notifier on every accepted lifecycle transition.
/// Delivery (mail, push, ...) lives behind the `Notifier` port; the core
/// only states what happened.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    BookingRequested { booking_id: String, slot_id: String, user_id: String },
    BookingConfirmed { booking_id: String, user_id: String },
    BookingOnSite { booking_id: String, address: String },
    BookingCancelled { booking_id: String, reason: Option<String> },
    BookingCompleted { booking_id: String },
    BookingExpired { booking_id: String },
}
