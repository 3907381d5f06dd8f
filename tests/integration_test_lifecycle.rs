mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{parse_body, TestApp, ADMIN, USER_A};
use serde_json::json;

async fn setup_pending_booking(app: &TestApp) -> String {
    let start = Utc::now() + Duration::days(2);
    app.create_window(start, start + Duration::hours(1)).await;
    let listing = app.available_slots().await;
    let slot_id = listing["slots"][0]["id"].as_str().unwrap().to_string();

    let response = app.send(
        "POST", "/appointments/create", USER_A,
        Some(json!({ "slotId": slot_id })),
    ).await;
    assert_eq!(response.status(), StatusCode::OK);
    parse_body(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_confirm_then_mark_on_site() {
    let app = TestApp::new().await;
    let booking_id = setup_pending_booking(&app).await;

    let confirm = app.send(
        "PUT",
        &format!("/appointments/status/{}?status=CONFIRMED", booking_id),
        ADMIN,
        None,
    ).await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert_eq!(parse_body(confirm).await["status"], "CONFIRMED");

    let on_site = app.send(
        "PUT",
        &format!("/appointments/status/{}?status=ON_SITE&address=Calle%20Falsa%20123", booking_id),
        ADMIN,
        None,
    ).await;
    assert_eq!(on_site.status(), StatusCode::OK);
    let body = parse_body(on_site).await;
    assert_eq!(body["status"], "ON_SITE");
    assert_eq!(body["address"], "Calle Falsa 123");

    // The address sticks on the booking record.
    let fetched = app.send(
        "GET", &format!("/appointments/getById/{}", booking_id), ADMIN, None,
    ).await;
    assert_eq!(parse_body(fetched).await["address"], "Calle Falsa 123");
}

#[tokio::test]
async fn test_on_site_requires_an_address() {
    let app = TestApp::new().await;
    let booking_id = setup_pending_booking(&app).await;

    app.send("PUT", &format!("/appointments/status/{}?status=CONFIRMED", booking_id), ADMIN, None).await;

    let missing = app.send(
        "PUT",
        &format!("/appointments/status/{}?status=ON_SITE", booking_id),
        ADMIN,
        None,
    ).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let blank = app.send(
        "PUT",
        &format!("/appointments/status/{}?status=ON_SITE&address=%20%20", booking_id),
        ADMIN,
        None,
    ).await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_on_site_straight_from_pending_is_illegal() {
    let app = TestApp::new().await;
    let booking_id = setup_pending_booking(&app).await;

    let response = app.send(
        "PUT",
        &format!("/appointments/status/{}?status=ON_SITE&address=Calle%20Falsa%20123", booking_id),
        ADMIN,
        None,
    ).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Booking is untouched.
    let fetched = app.send("GET", &format!("/appointments/getById/{}", booking_id), ADMIN, None).await;
    assert_eq!(parse_body(fetched).await["status"], "PENDING");
}

#[tokio::test]
async fn test_complete_only_from_on_site() {
    let app = TestApp::new().await;
    let booking_id = setup_pending_booking(&app).await;

    app.send("PUT", &format!("/appointments/status/{}?status=CONFIRMED", booking_id), ADMIN, None).await;

    let premature = app.send(
        "PUT", &format!("/appointments/status/{}?status=COMPLETED", booking_id), ADMIN, None,
    ).await;
    assert_eq!(premature.status(), StatusCode::UNPROCESSABLE_ENTITY);

    app.send(
        "PUT",
        &format!("/appointments/status/{}?status=ON_SITE&address=Calle%20Falsa%20123", booking_id),
        ADMIN,
        None,
    ).await;

    let complete = app.send(
        "PUT", &format!("/appointments/status/{}?status=COMPLETED", booking_id), ADMIN, None,
    ).await;
    assert_eq!(complete.status(), StatusCode::OK);
    assert_eq!(parse_body(complete).await["status"], "COMPLETED");
}

#[tokio::test]
async fn test_unknown_status_is_rejected_at_the_boundary() {
    let app = TestApp::new().await;
    let booking_id = setup_pending_booking(&app).await;

    let response = app.send(
        "PUT",
        &format!("/appointments/status/{}?status=ACCEPTED", booking_id),
        ADMIN,
        None,
    ).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pending_and_expired_cannot_be_set_directly() {
    let app = TestApp::new().await;
    let booking_id = setup_pending_booking(&app).await;

    for status in ["PENDING", "EXPIRED"] {
        let response = app.send(
            "PUT",
            &format!("/appointments/status/{}?status={}", booking_id, status),
            ADMIN,
            None,
        ).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "status {} should be rejected", status);
    }
}

#[tokio::test]
async fn test_tenants_cannot_drive_admin_transitions() {
    let app = TestApp::new().await;
    let booking_id = setup_pending_booking(&app).await;

    let response = app.send(
        "PUT",
        &format!("/appointments/status/{}?status=CONFIRMED", booking_id),
        USER_A,
        None,
    ).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_transition_on_unknown_booking_is_not_found() {
    let app = TestApp::new().await;

    let response = app.send(
        "PUT",
        "/appointments/status/no-such-booking?status=CONFIRMED",
        ADMIN,
        None,
    ).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
