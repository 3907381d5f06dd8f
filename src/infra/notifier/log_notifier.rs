use crate::domain::models::event::DomainEvent;
use crate::domain::ports::Notifier;
use crate::error::AppError;
use async_trait::async_trait;
use tracing::info;

/// Default notifier: writes each domain event to the structured log.
/// Actual delivery (mail, push) belongs to the external notifier service
/// consuming these events; swap the port implementation to integrate one.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, event: DomainEvent) -> Result<(), AppError> {
        let payload = serde_json::to_string(&event).map_err(|_| AppError::Internal)?;
        info!(event = %payload, "domain event");
        Ok(())
    }
}
