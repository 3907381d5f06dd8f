use crate::domain::{models::window::AvailabilityWindow, ports::WindowRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresWindowRepo {
    pool: PgPool,
}

impl PostgresWindowRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WindowRepository for PostgresWindowRepo {
    async fn create(&self, window: &AvailabilityWindow) -> Result<AvailabilityWindow, AppError> {
        sqlx::query_as::<_, AvailabilityWindow>(
            "INSERT INTO availability_windows (id, start_at, end_at, created_by, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
            .bind(&window.id).bind(window.start_at).bind(window.end_at)
            .bind(&window.created_by).bind(window.active).bind(window.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilityWindow>, AppError> {
        sqlx::query_as::<_, AvailabilityWindow>("SELECT * FROM availability_windows WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_overlap(&self, start: DateTime<Utc>, end: DateTime<Utc>, exclude_id: Option<&str>) -> Result<Vec<AvailabilityWindow>, AppError> {
        sqlx::query_as::<_, AvailabilityWindow>(
            "SELECT * FROM availability_windows WHERE start_at < $1 AND end_at > $2 AND id != $3"
        )
            .bind(end).bind(start).bind(exclude_id.unwrap_or(""))
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<AvailabilityWindow>, AppError> {
        sqlx::query_as::<_, AvailabilityWindow>(
            "SELECT * FROM availability_windows WHERE start_at <= $1 AND end_at >= $2 ORDER BY start_at ASC"
        )
            .bind(to).bind(from)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, window: &AvailabilityWindow) -> Result<AvailabilityWindow, AppError> {
        sqlx::query_as::<_, AvailabilityWindow>(
            "UPDATE availability_windows SET start_at = $1, end_at = $2, active = $3
             WHERE id = $4
             RETURNING *"
        )
            .bind(window.start_at).bind(window.end_at).bind(window.active).bind(&window.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Availability window not found".into()))
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<AvailabilityWindow, AppError> {
        sqlx::query_as::<_, AvailabilityWindow>(
            "UPDATE availability_windows SET active = $1 WHERE id = $2 RETURNING *"
        )
            .bind(active).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Availability window not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM slots WHERE window_id = $1")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM availability_windows WHERE id = $1")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Availability window not found".into()));
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
