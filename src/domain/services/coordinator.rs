use std::sync::Arc;
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::event::DomainEvent;
use crate::domain::ports::{BookingRepository, SlotRepository};
use crate::domain::services::cancellation::CancellationHandler;
use crate::domain::services::lifecycle::StatusLifecycleManager;
use crate::error::{is_transient, AppError};

const RESERVE_ATTEMPTS: u32 = 3;
const RESERVE_BACKOFF_BASE_MS: u64 = 50;

/// Sole writer of slot and booking mutations. Every reservation funnels
/// through `request_booking`'s atomic check-and-set; every lifecycle move
/// goes through the transition table.
pub struct BookingCoordinator {
    slot_repo: Arc<dyn SlotRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    lifecycle: Arc<StatusLifecycleManager>,
    cancellation: Arc<CancellationHandler>,
    min_lead_time: Duration,
    expiry_grace: Duration,
}

impl BookingCoordinator {
    pub fn new(
        slot_repo: Arc<dyn SlotRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        lifecycle: Arc<StatusLifecycleManager>,
        cancellation: Arc<CancellationHandler>,
        config: &Config,
    ) -> Self {
        Self {
            slot_repo,
            booking_repo,
            lifecycle,
            cancellation,
            min_lead_time: Duration::hours(config.min_lead_time_hours),
            expiry_grace: Duration::minutes(config.expiry_grace_min),
        }
    }

    /// Validates lead time, then reserves the slot and inserts the PENDING
    /// booking in one atomic unit. Of N concurrent callers on the same slot
    /// exactly one wins; the rest see `SlotUnavailable`.
    pub async fn request_booking(
        &self,
        user_id: &str,
        slot_id: &str,
        address: Option<String>,
    ) -> Result<Booking, AppError> {
        let slot = self.slot_repo.find_by_id(slot_id).await?
            .ok_or(AppError::NotFound("Slot not found".into()))?;

        // Rejected before any storage write, regardless of slot status.
        if slot.start_at < Utc::now() + self.min_lead_time {
            return Err(AppError::Validation(format!(
                "Slot must start at least {} hours from now",
                self.min_lead_time.num_hours()
            )));
        }

        let booking = Booking::new(user_id, &slot, address);
        let created = self.reserve_with_retry(&booking).await?;

        info!("Booking {} requested for slot {} by user {}", created.id, slot.id, user_id);
        self.lifecycle.emit(DomainEvent::BookingRequested {
            booking_id: created.id.clone(),
            slot_id: created.slot_id.clone(),
            user_id: created.requester_user_id.clone(),
        }).await;

        Ok(created)
    }

    pub async fn confirm_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.fetch(booking_id).await?;
        let status = booking.parsed_status()?;
        self.lifecycle.ensure(status, BookingStatus::Confirmed)?;

        let updated = self.guarded_set(&booking.id, status, BookingStatus::Confirmed, None).await?;
        self.lifecycle.emit(DomainEvent::BookingConfirmed {
            booking_id: updated.id.clone(),
            user_id: updated.requester_user_id.clone(),
        }).await;
        Ok(updated)
    }

    pub async fn mark_on_site(&self, booking_id: &str, address: &str) -> Result<Booking, AppError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::Validation("An address is required to mark a visit on site".into()));
        }

        let booking = self.fetch(booking_id).await?;
        let status = booking.parsed_status()?;
        self.lifecycle.ensure(status, BookingStatus::OnSite)?;

        let updated = self.guarded_set(&booking.id, status, BookingStatus::OnSite, Some(address)).await?;
        self.lifecycle.emit(DomainEvent::BookingOnSite {
            booking_id: updated.id.clone(),
            address: address.to_string(),
        }).await;
        Ok(updated)
    }

    pub async fn complete_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.fetch(booking_id).await?;
        let status = booking.parsed_status()?;
        self.lifecycle.ensure(status, BookingStatus::Completed)?;

        let updated = self.guarded_set(&booking.id, status, BookingStatus::Completed, None).await?;
        self.lifecycle.emit(DomainEvent::BookingCompleted {
            booking_id: updated.id.clone(),
        }).await;
        Ok(updated)
    }

    pub async fn cancel_booking(&self, booking_id: &str, reason: Option<String>) -> Result<Booking, AppError> {
        self.cancellation.cancel(booking_id, reason).await
    }

    /// Expiry sweep: PENDING/CONFIRMED bookings whose slot started more than
    /// the grace period ago move to EXPIRED. Safe to invoke concurrently;
    /// the guarded update lets only one sweep claim each booking.
    pub async fn expire_due(&self) -> Result<usize, AppError> {
        let cutoff = Utc::now() - self.expiry_grace;
        let expired = self.booking_repo.expire_overdue(cutoff).await?;

        for booking in &expired {
            self.lifecycle.emit(DomainEvent::BookingExpired {
                booking_id: booking.id.clone(),
            }).await;
        }

        if !expired.is_empty() {
            info!("Expired {} overdue bookings", expired.len());
        }
        Ok(expired.len())
    }

    async fn fetch(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn guarded_set(
        &self,
        booking_id: &str,
        expected: BookingStatus,
        to: BookingStatus,
        address: Option<&str>,
    ) -> Result<Booking, AppError> {
        match self.booking_repo.set_status(booking_id, expected.as_str(), to.as_str(), address).await? {
            Some(updated) => Ok(updated),
            // Somebody moved the booking between our read and the write.
            None => Err(AppError::IllegalTransition(
                "Booking status changed concurrently; re-fetch and retry".into(),
            )),
        }
    }

    async fn reserve_with_retry(&self, booking: &Booking) -> Result<Booking, AppError> {
        let mut attempt = 0;
        loop {
            match self.booking_repo.create_reserving_slot(booking).await {
                Err(AppError::Database(e)) if is_transient(&e) => {
                    attempt += 1;
                    if attempt >= RESERVE_ATTEMPTS {
                        return Err(AppError::TransientStorage(format!(
                            "slot reservation failed after {} attempts: {}", attempt, e
                        )));
                    }
                    let backoff = RESERVE_BACKOFF_BASE_MS * 2u64.pow(attempt)
                        + rand::thread_rng().gen_range(0..RESERVE_BACKOFF_BASE_MS);
                    warn!("Transient storage error reserving slot {} (attempt {}), backing off {}ms",
                        booking.slot_id, attempt, backoff);
                    tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
                }
                other => return other,
            }
        }
    }
}
