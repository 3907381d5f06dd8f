use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateAppointmentRequest, StatusFilterParams, StatusUpdateParams};
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::domain::models::booking::BookingStatus;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.coordinator
        .request_booking(&identity.user_id, &payload.slot_id, payload.address)
        .await?;
    Ok(Json(booking))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Query(params): Query<StatusUpdateParams>,
) -> Result<impl IntoResponse, AppError> {
    let updated = match params.status {
        BookingStatus::Confirmed => {
            require_admin(&identity)?;
            state.coordinator.confirm_booking(&id).await?
        }
        BookingStatus::OnSite => {
            require_admin(&identity)?;
            let address = params.address
                .ok_or(AppError::Validation("The 'address' parameter is required for ON_SITE".into()))?;
            state.coordinator.mark_on_site(&id, &address).await?
        }
        BookingStatus::Completed => {
            require_admin(&identity)?;
            state.coordinator.complete_booking(&id).await?
        }
        BookingStatus::Cancelled => {
            let booking = state.booking_repo.find_by_id(&id).await?
                .ok_or(AppError::NotFound("Booking not found".into()))?;
            if !identity.can_act_on(&booking.requester_user_id) {
                return Err(AppError::Forbidden("You may only cancel your own bookings".into()));
            }
            state.coordinator.cancel_booking(&id, params.reason).await?
        }
        BookingStatus::Pending | BookingStatus::Expired => {
            return Err(AppError::Validation(format!(
                "Status {} cannot be set directly", params.status
            )));
        }
    };

    info!("Booking {} moved to {}", updated.id, updated.status);
    Ok(Json(updated))
}

pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if !identity.can_act_on(&booking.requester_user_id) {
        return Err(AppError::Forbidden("You may only cancel your own bookings".into()));
    }

    state.coordinator.cancel_booking(&id, None).await?;
    info!("Booking {} cancelled", id);
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if !identity.can_act_on(&booking.requester_user_id) {
        return Err(AppError::Forbidden("You may only view your own bookings".into()));
    }
    Ok(Json(booking))
}

pub async fn list_all_appointments(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_all().await?;
    Ok(Json(bookings))
}

pub async fn list_user_appointments(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !identity.can_act_on(&user_id) {
        return Err(AppError::Forbidden("You may only view your own bookings".into()));
    }
    let bookings = state.booking_repo.list_by_user(&user_id).await?;
    Ok(Json(bookings))
}

pub async fn list_by_status(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<StatusFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_status(params.status.as_str()).await?;
    Ok(Json(bookings))
}

fn require_admin(identity: &crate::domain::models::identity::Identity) -> Result<(), AppError> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden("Only admins may update booking status".into()));
    }
    Ok(())
}
