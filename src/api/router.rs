use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::api::handlers::{appointment, availability, health};
use crate::state::AppState;
use tower_http::{
    classify::ServerErrorsFailureClass,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Availability windows & derived slots
        .route("/availableAppointments/available", get(availability::available_slots))
        .route("/availableAppointments/unavailable", get(availability::unavailable_slots))
        .route("/availableAppointments/list", get(availability::list_windows))
        .route("/availableAppointments/create", post(availability::create_window))
        .route("/availableAppointments/update/{id}", put(availability::update_window))
        .route("/availableAppointments/updateAvailability/{id}", patch(availability::toggle_window))
        .route("/availableAppointments/delete/{id}", delete(availability::delete_window))

        // Booking lifecycle
        .route("/appointments/create", post(appointment::create_appointment))
        .route("/appointments/status/{id}", put(appointment::update_status))
        .route("/appointments/delete/{id}", delete(appointment::delete_appointment))
        .route("/appointments/getById/{id}", get(appointment::get_appointment))
        .route("/appointments/getAll", get(appointment::list_all_appointments))
        .route("/appointments/user/{user_id}", get(appointment::list_user_appointments))
        .route("/appointments/status", get(appointment::list_by_status))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
