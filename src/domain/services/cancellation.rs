use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::event::DomainEvent;
use crate::domain::ports::BookingRepository;
use crate::domain::services::lifecycle::StatusLifecycleManager;
use crate::error::AppError;

/// Terminates a booking and releases its slot back to availability.
/// Idempotent: cancelling an already-cancelled booking succeeds without
/// touching storage, so double-confirmation dialogs may fire the call twice.
pub struct CancellationHandler {
    booking_repo: Arc<dyn BookingRepository>,
    lifecycle: Arc<StatusLifecycleManager>,
}

impl CancellationHandler {
    pub fn new(booking_repo: Arc<dyn BookingRepository>, lifecycle: Arc<StatusLifecycleManager>) -> Self {
        Self { booking_repo, lifecycle }
    }

    pub async fn cancel(&self, booking_id: &str, reason: Option<String>) -> Result<Booking, AppError> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;
        let status = booking.parsed_status()?;

        if status == BookingStatus::Cancelled {
            return Ok(booking);
        }

        self.lifecycle.ensure(status, BookingStatus::Cancelled)?;

        if booking.slot_start_at <= Utc::now() {
            // The viewing time has already passed: this booking expires via
            // the sweep, it cannot be cancelled anymore.
            return Err(AppError::IllegalTransition(
                "Slot time has elapsed; the booking is expired, not cancellable".into(),
            ));
        }

        match self.booking_repo
            .cancel_releasing_slot(&booking.id, &booking.slot_id, reason.as_deref())
            .await?
        {
            Some(cancelled) => {
                info!("Booking {} cancelled, slot {} released", cancelled.id, cancelled.slot_id);
                self.lifecycle.emit(DomainEvent::BookingCancelled {
                    booking_id: cancelled.id.clone(),
                    reason: cancelled.cancellation_reason.clone(),
                }).await;
                Ok(cancelled)
            }
            None => {
                // The row moved under us. A concurrent cancel still counts
                // as success; anything else is a dead transition.
                let current = self.booking_repo.find_by_id(booking_id).await?
                    .ok_or(AppError::NotFound("Booking not found".into()))?;
                if current.parsed_status()? == BookingStatus::Cancelled {
                    Ok(current)
                } else {
                    Err(AppError::IllegalTransition(
                        format!("Cannot cancel a booking in status {}", current.status),
                    ))
                }
            }
        }
    }
}
