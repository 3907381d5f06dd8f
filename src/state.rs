use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{BookingRepository, Notifier, SlotRepository, WindowRepository};
use crate::domain::services::cancellation::CancellationHandler;
use crate::domain::services::coordinator::BookingCoordinator;
use crate::domain::services::lifecycle::StatusLifecycleManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub window_repo: Arc<dyn WindowRepository>,
    pub slot_repo: Arc<dyn SlotRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub lifecycle: Arc<StatusLifecycleManager>,
    pub cancellation: Arc<CancellationHandler>,
    pub coordinator: Arc<BookingCoordinator>,
}
