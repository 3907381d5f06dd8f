use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgConnectOptions, PgPoolOptions}, sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{BookingRepository, SlotRepository, WindowRepository};
use crate::domain::services::cancellation::CancellationHandler;
use crate::domain::services::coordinator::BookingCoordinator;
use crate::domain::services::lifecycle::StatusLifecycleManager;
use crate::infra::notifier::log_notifier::LogNotifier;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_slot_repo::PostgresSlotRepo,
    postgres_window_repo::PostgresWindowRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_slot_repo::SqliteSlotRepo, sqlite_window_repo::SqliteWindowRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(PostgresWindowRepo::new(pool.clone())),
            Arc::new(PostgresSlotRepo::new(pool.clone())),
            Arc::new(PostgresBookingRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(SqliteWindowRepo::new(pool.clone())),
            Arc::new(SqliteSlotRepo::new(pool.clone())),
            Arc::new(SqliteBookingRepo::new(pool)),
        )
    }
}

fn assemble_state(
    config: &Config,
    window_repo: Arc<dyn WindowRepository>,
    slot_repo: Arc<dyn SlotRepository>,
    booking_repo: Arc<dyn BookingRepository>,
) -> AppState {
    let notifier = Arc::new(LogNotifier);
    let lifecycle = Arc::new(StatusLifecycleManager::new(notifier.clone()));
    let cancellation = Arc::new(CancellationHandler::new(booking_repo.clone(), lifecycle.clone()));
    let coordinator = Arc::new(BookingCoordinator::new(
        slot_repo.clone(),
        booking_repo.clone(),
        lifecycle.clone(),
        cancellation.clone(),
        config,
    ));

    AppState {
        config: config.clone(),
        window_repo,
        slot_repo,
        booking_repo,
        notifier,
        lifecycle,
        cancellation,
        coordinator,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
