use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::api::dtos::requests::{CreateWindowRequest, DeleteWindowParams, ListWindowsParams, SlotRangeParams, UpdateWindowRequest};
use crate::api::dtos::responses::{SlotListResponse, WindowMaterializedResponse};
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::domain::models::booking::BookingStatus;
use crate::domain::models::event::DomainEvent;
use crate::domain::models::window::AvailabilityWindow;
use crate::domain::services::slots::materialize_slots;
use crate::error::AppError;
use crate::state::AppState;

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<SlotRangeParams>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let from = params.from.unwrap_or(now).max(now);
    if let Some(to) = params.to {
        if to <= from {
            return Err(AppError::Validation("'to' must be after 'from'".into()));
        }
    }

    let slots = state.slot_repo.list_free_in_range(from, params.to).await?;
    let version = state.slot_repo.version_sum().await?;
    Ok(Json(SlotListResponse { version, slots }))
}

pub async fn unavailable_slots(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let slots = state.slot_repo.list_unavailable().await?;
    let version = state.slot_repo.version_sum().await?;
    Ok(Json(SlotListResponse { version, slots }))
}

pub async fn list_windows(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ListWindowsParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.from > params.to {
        return Err(AppError::Validation("'from' must not be after 'to'".into()));
    }
    let windows = state.window_repo.list_by_range(params.from, params.to).await?;
    Ok(Json(windows))
}

pub async fn create_window(
    State(state): State<Arc<AppState>>,
    AdminUser(identity): AdminUser,
    Json(payload): Json<CreateWindowRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.start_at >= payload.end_at {
        return Err(AppError::Validation("Window start must be before its end".into()));
    }

    let overlapping = state.window_repo.find_overlap(payload.start_at, payload.end_at, None).await?;
    if !overlapping.is_empty() {
        return Err(AppError::Conflict("Window overlaps an existing availability window".into()));
    }

    let window = AvailabilityWindow::new(payload.start_at, payload.end_at, identity.user_id);
    let created = state.window_repo.create(&window).await?;

    let slots = materialize_slots(&created, state.config.slot_duration_min);
    let slots_created = state.slot_repo.upsert_for_window(&slots).await?;

    info!("Window {} created with {} slots", created.id, slots_created);
    Ok(Json(WindowMaterializedResponse { window: created, slots_created, slots_removed: 0 }))
}

pub async fn update_window(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateWindowRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.start_at >= payload.end_at {
        return Err(AppError::Validation("Window start must be before its end".into()));
    }

    let mut window = state.window_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Availability window not found".into()))?;

    let overlapping = state.window_repo.find_overlap(payload.start_at, payload.end_at, Some(&id)).await?;
    if !overlapping.is_empty() {
        return Err(AppError::Conflict("Window overlaps an existing availability window".into()));
    }

    let reserved_outside = state.slot_repo
        .count_reserved_outside(&id, payload.start_at, payload.end_at).await?;
    if reserved_outside > 0 {
        return Err(AppError::Conflict(format!(
            "{} reserved slots would fall outside the edited window", reserved_outside
        )));
    }

    window.start_at = payload.start_at;
    window.end_at = payload.end_at;
    let updated = state.window_repo.update(&window).await?;

    let slots_removed = state.slot_repo.prune_outside(&id, updated.start_at, updated.end_at).await?;
    let slots = materialize_slots(&updated, state.config.slot_duration_min);
    let slots_created = state.slot_repo.upsert_for_window(&slots).await?;

    info!("Window {} updated: {} slots added, {} removed", updated.id, slots_created, slots_removed);
    Ok(Json(WindowMaterializedResponse { window: updated, slots_created, slots_removed }))
}

pub async fn toggle_window(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let window = state.window_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Availability window not found".into()))?;

    let updated = state.window_repo.set_active(&id, !window.active).await?;
    info!("Window {} active flag set to {}", updated.id, updated.active);
    Ok(Json(updated))
}

pub async fn delete_window(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(params): Query<DeleteWindowParams>,
) -> Result<impl IntoResponse, AppError> {
    state.window_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Availability window not found".into()))?;

    let active = state.booking_repo.list_active_for_window(&id).await?;

    if !active.is_empty() && !params.cascade.unwrap_or(false) {
        return Err(AppError::Conflict(format!(
            "Window has {} active bookings; pass cascade=true to cancel them", active.len()
        )));
    }

    for booking in &active {
        let status = booking.parsed_status()?;
        if status == BookingStatus::OnSite {
            return Err(AppError::Conflict(
                "Window has a visit in progress and cannot be deleted".into(),
            ));
        }
        if booking.slot_start_at <= Utc::now() {
            // Past its slot time the booking expires rather than cancels.
            let expired = state.booking_repo
                .set_status(&booking.id, status.as_str(), BookingStatus::Expired.as_str(), None)
                .await?;
            if expired.is_some() {
                state.lifecycle.emit(DomainEvent::BookingExpired {
                    booking_id: booking.id.clone(),
                }).await;
            }
        } else {
            state.cancellation
                .cancel(&booking.id, Some("Availability window removed".to_string()))
                .await?;
        }
    }

    state.window_repo.delete(&id).await?;
    info!("Window {} deleted ({} bookings terminated)", id, active.len());
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
