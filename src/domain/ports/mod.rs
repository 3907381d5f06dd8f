use crate::domain::models::{
    booking::Booking, event::DomainEvent, slot::Slot, window::AvailabilityWindow,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait WindowRepository: Send + Sync {
    async fn create(&self, window: &AvailabilityWindow) -> Result<AvailabilityWindow, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilityWindow>, AppError>;
    /// Windows intersecting `[start, end)`, optionally excluding one id
    /// (the window being edited).
    async fn find_overlap(&self, start: DateTime<Utc>, end: DateTime<Utc>, exclude_id: Option<&str>) -> Result<Vec<AvailabilityWindow>, AppError>;
    async fn list_by_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<AvailabilityWindow>, AppError>;
    async fn update(&self, window: &AvailabilityWindow) -> Result<AvailabilityWindow, AppError>;
    async fn set_active(&self, id: &str, active: bool) -> Result<AvailabilityWindow, AppError>;
    /// Removes the window and all of its slots in one transaction.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Upsert keyed by `(window_id, start_at)`; re-materializing a window
    /// never duplicates slots. Returns how many rows were newly inserted.
    async fn upsert_for_window(&self, slots: &[Slot]) -> Result<u64, AppError>;
    /// Drops FREE slots of the window falling outside `[start, end)` after a
    /// window edit. Reserved slots are left untouched. Returns rows removed.
    async fn prune_outside(&self, window_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Slot>, AppError>;
    /// FREE slots of active windows with `start_at` in `[from, to)`, ordered
    /// by `start_at` then id. No upper bound when `to` is None.
    async fn list_free_in_range(&self, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Result<Vec<Slot>, AppError>;
    /// All non-FREE slots, same ordering.
    async fn list_unavailable(&self) -> Result<Vec<Slot>, AppError>;
    async fn list_by_window(&self, window_id: &str) -> Result<Vec<Slot>, AppError>;
    /// Reserved slots of the window lying outside `[start, end)`; edits
    /// that would orphan them are rejected.
    async fn count_reserved_outside(&self, window_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError>;
    /// Sum of slot versions; monotonic across booking mutations, used as the
    /// freshness token on slot listings.
    async fn version_sum(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// The atomic check-and-set at the heart of the booking flow: flips the
    /// slot FREE -> RESERVED (active window only) and inserts the booking in
    /// one transaction. `SlotUnavailable` when the slot was not FREE.
    async fn create_reserving_slot(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_active_for_slot(&self, slot_id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_all(&self) -> Result<Vec<Booking>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_status(&self, status: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_active_for_window(&self, window_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Guarded status write: applies only when the row still holds
    /// `expected`. Returns the updated booking, or None when the guard
    /// missed (the status moved concurrently).
    async fn set_status(&self, id: &str, expected: &str, to: &str, address: Option<&str>) -> Result<Option<Booking>, AppError>;
    /// Terminal cancellation plus slot release in one transaction. Returns
    /// None when the booking was not in a cancellable status anymore.
    async fn cancel_releasing_slot(&self, id: &str, slot_id: &str, reason: Option<&str>) -> Result<Option<Booking>, AppError>;
    /// Moves every PENDING/CONFIRMED booking whose slot start lies before
    /// `cutoff` to EXPIRED. The conditional update makes a racing second
    /// sweep a no-op.
    async fn expire_overdue(&self, cutoff: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), AppError>;
}
