use viewing_scheduler::{
    api::router::create_router,
    config::Config,
    domain::ports::{BookingRepository, Notifier, SlotRepository, WindowRepository},
    domain::services::cancellation::CancellationHandler,
    domain::services::coordinator::BookingCoordinator,
    domain::services::lifecycle::StatusLifecycleManager,
    infra::notifier::log_notifier::LogNotifier,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_slot_repo::SqliteSlotRepo,
        sqlite_window_repo::SqliteWindowRepo,
    },
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub const ADMIN: (&str, &str) = ("admin-1", "admin");
#[allow(dead_code)]
pub const USER_A: (&str, &str) = ("user-a", "tenant");
#[allow(dead_code)]
pub const USER_B: (&str, &str) = ("user-b", "tenant");

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            slot_duration_min: 30,
            min_lead_time_hours: 24,
            expiry_grace_min: 60,
            sweep_interval_secs: 3600,
            sweep_enabled: false,
        };

        let window_repo: Arc<dyn WindowRepository> = Arc::new(SqliteWindowRepo::new(pool.clone()));
        let slot_repo: Arc<dyn SlotRepository> = Arc::new(SqliteSlotRepo::new(pool.clone()));
        let booking_repo: Arc<dyn BookingRepository> = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
        let lifecycle = Arc::new(StatusLifecycleManager::new(notifier.clone()));
        let cancellation = Arc::new(CancellationHandler::new(booking_repo.clone(), lifecycle.clone()));
        let coordinator = Arc::new(BookingCoordinator::new(
            slot_repo.clone(),
            booking_repo.clone(),
            lifecycle.clone(),
            cancellation.clone(),
            &config,
        ));

        let state = Arc::new(AppState {
            config,
            window_repo,
            slot_repo,
            booking_repo,
            notifier,
            lifecycle,
            cancellation,
            coordinator,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, user: (&str, &str), body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", user.0)
            .header("x-user-role", user.1);

        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    /// Creates a window as admin and returns the parsed response body.
    #[allow(dead_code)]
    pub async fn create_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Value {
        let response = self.send(
            "POST",
            "/availableAppointments/create",
            ADMIN,
            Some(json!({
                "startAt": start.to_rfc3339_opts(SecondsFormat::Secs, true),
                "endAt": end.to_rfc3339_opts(SecondsFormat::Secs, true),
            })),
        ).await;

        assert!(response.status().is_success(), "window creation failed: {}", response.status());
        parse_body(response).await
    }

    /// Free slots visible to a regular user.
    #[allow(dead_code)]
    pub async fn available_slots(&self) -> Value {
        let response = self.send("GET", "/availableAppointments/available", USER_A, None).await;
        assert!(response.status().is_success());
        parse_body(response).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// RFC3339 with a trailing Z, safe to embed in query strings.
#[allow(dead_code)]
pub fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
