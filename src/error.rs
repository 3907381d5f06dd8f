use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),
    #[error("Illegal status transition: {0}")]
    IllegalTransition(String),
    #[error("Storage temporarily unavailable: {0}")]
    TransientStorage(String),
    #[error("Internal server error")]
    Internal,
}

/// Unique-constraint violation codes.
/// 2067 / 1555 = SQLite constraint, 23505 = PostgreSQL unique_violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let Some(db_err) = err.as_database_error() {
        let code = db_err.code().unwrap_or_default();
        return code == "2067" || code == "1555" || code == "23505";
    }
    false
}

/// Lock contention the caller may retry.
/// 5 = SQLITE_BUSY, 40001 = serialization_failure, 40P01 = deadlock_detected.
pub fn is_transient(err: &sqlx::Error) -> bool {
    if let Some(db_err) = err.as_database_error() {
        let code = db_err.code().unwrap_or_default();
        return code == "5" || code == "40001" || code == "40P01";
    }
    matches!(err, sqlx::Error::PoolTimedOut)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    // The partial unique index on active bookings fired:
                    // somebody else holds the slot.
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Slot is no longer available" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::SlotUnavailable(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::IllegalTransition(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::TransientStorage(msg) => {
                error!("Transient storage failure surfaced: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Storage temporarily unavailable".to_string())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
