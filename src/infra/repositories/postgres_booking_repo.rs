use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_reserving_slot(&self, booking: &Booking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Check-and-set: only a FREE slot of an active window flips to
        // RESERVED. Losing the race means zero rows affected, not an error.
        let reserved = sqlx::query(
            "UPDATE slots SET status = 'RESERVED', version = version + 1
             WHERE id = $1 AND status = 'FREE'
               AND EXISTS (SELECT 1 FROM availability_windows w WHERE w.id = slots.window_id AND w.active)"
        )
            .bind(&booking.slot_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if reserved.rows_affected() == 0 {
            return Err(AppError::SlotUnavailable("Slot is no longer available".into()));
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, slot_id, slot_start_at, requester_user_id, address, status, cancellation_reason, requested_at, status_updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.slot_id).bind(booking.slot_start_at)
            .bind(&booking.requester_user_id).bind(&booking.address).bind(&booking.status)
            .bind(&booking.cancellation_reason).bind(booking.requested_at).bind(booking.status_updated_at)
            .fetch_one(&mut *tx).await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::SlotUnavailable("Slot is no longer available".into())
                } else {
                    AppError::Database(e)
                }
            })?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active_for_slot(&self, slot_id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE slot_id = $1 AND status IN ('PENDING', 'CONFIRMED', 'ON_SITE')"
        )
            .bind(slot_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY slot_start_at ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE requester_user_id = $1 ORDER BY slot_start_at ASC"
        )
            .bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_status(&self, status: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = $1 ORDER BY slot_start_at ASC"
        )
            .bind(status).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_for_window(&self, window_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT b.* FROM bookings b
             JOIN slots s ON s.id = b.slot_id
             WHERE s.window_id = $1 AND b.status IN ('PENDING', 'CONFIRMED', 'ON_SITE')"
        )
            .bind(window_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_status(&self, id: &str, expected: &str, to: &str, address: Option<&str>) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, status_updated_at = $2, address = COALESCE($3, address)
             WHERE id = $4 AND status = $5
             RETURNING *"
        )
            .bind(to).bind(Utc::now()).bind(address).bind(id).bind(expected)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel_releasing_slot(&self, id: &str, slot_id: &str, reason: Option<&str>) -> Result<Option<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'CANCELLED', cancellation_reason = $1, status_updated_at = $2
             WHERE id = $3 AND status IN ('PENDING', 'CONFIRMED')
             RETURNING *"
        )
            .bind(reason).bind(Utc::now()).bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let Some(cancelled) = cancelled else {
            return Ok(None);
        };

        sqlx::query("UPDATE slots SET status = 'FREE', version = version + 1 WHERE id = $1 AND status = 'RESERVED'")
            .bind(slot_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(cancelled))
    }

    async fn expire_overdue(&self, cutoff: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'EXPIRED', status_updated_at = $1
             WHERE status IN ('PENDING', 'CONFIRMED') AND slot_start_at < $2
             RETURNING *"
        )
            .bind(Utc::now()).bind(cutoff)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
