use crate::domain::{models::slot::Slot, ports::SlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

pub struct SqliteSlotRepo {
    pool: SqlitePool,
}

impl SqliteSlotRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotRepository for SqliteSlotRepo {
    async fn upsert_for_window(&self, slots: &[Slot]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut inserted = 0u64;
        for slot in slots {
            let result = sqlx::query(
                "INSERT INTO slots (id, window_id, start_at, end_at, status, version)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT (window_id, start_at) DO NOTHING"
            )
                .bind(&slot.id).bind(&slot.window_id).bind(slot.start_at)
                .bind(slot.end_at).bind(&slot.status).bind(slot.version)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(inserted)
    }

    async fn prune_outside(&self, window_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM slots WHERE window_id = ? AND status = 'FREE' AND (start_at < ? OR end_at > ?)"
        )
            .bind(window_id).bind(start).bind(end)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Slot>, AppError> {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_free_in_range(&self, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Result<Vec<Slot>, AppError> {
        sqlx::query_as::<_, Slot>(
            "SELECT s.* FROM slots s
             JOIN availability_windows w ON w.id = s.window_id
             WHERE s.status = 'FREE' AND w.active = 1 AND s.start_at >= ?
               AND (? IS NULL OR s.start_at < ?)
             ORDER BY s.start_at ASC, s.id ASC"
        )
            .bind(from).bind(to).bind(to)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_unavailable(&self) -> Result<Vec<Slot>, AppError> {
        sqlx::query_as::<_, Slot>(
            "SELECT * FROM slots WHERE status != 'FREE' ORDER BY start_at ASC, id ASC"
        )
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_window(&self, window_id: &str) -> Result<Vec<Slot>, AppError> {
        sqlx::query_as::<_, Slot>(
            "SELECT * FROM slots WHERE window_id = ? ORDER BY start_at ASC, id ASC"
        )
            .bind(window_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_reserved_outside(&self, window_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError> {
        let result = sqlx::query(
            "SELECT COUNT(*) as count FROM slots
             WHERE window_id = ? AND status = 'RESERVED' AND (start_at < ? OR end_at > ?)"
        )
            .bind(window_id).bind(start).bind(end)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.get::<i64, _>("count"))
    }

    async fn version_sum(&self) -> Result<i64, AppError> {
        let result = sqlx::query("SELECT COALESCE(SUM(version), 0) as total FROM slots")
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.get::<i64, _>("total"))
    }
}
