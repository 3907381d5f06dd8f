use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::state::AppState;

/// Periodic expiry sweep: moves PENDING/CONFIRMED bookings whose slot time
/// plus the grace period has elapsed to EXPIRED.
///
/// Must run with single-leader semantics. The guarded update keeps a racing
/// second sweep from double-expiring a booking, but when scaling
/// horizontally only one instance should run it: set SWEEP_ENABLED=false on
/// the others.
pub async fn start_expiry_sweep(state: Arc<AppState>) {
    info!("Starting booking expiry sweep...");

    let interval = Duration::from_secs(state.config.sweep_interval_secs);

    loop {
        match state.coordinator.expire_due().await {
            Ok(0) => {}
            Ok(count) => info!("Expiry sweep moved {} bookings to EXPIRED", count),
            Err(e) => error!("Expiry sweep failed: {:?}", e),
        }
        sleep(interval).await;
    }
}
