use std::sync::Arc;
use tracing::error;

use crate::domain::models::booking::BookingStatus;
use crate::domain::models::event::DomainEvent;
use crate::domain::ports::Notifier;
use crate::error::AppError;

/// The legal transition table:
///
/// ```text
/// PENDING   -> CONFIRMED | CANCELLED | EXPIRED
/// CONFIRMED -> ON_SITE   | CANCELLED | EXPIRED
/// ON_SITE   -> COMPLETED
/// ```
pub fn is_legal_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Pending, Expired)
            | (Confirmed, OnSite)
            | (Confirmed, Cancelled)
            | (Confirmed, Expired)
            | (OnSite, Completed)
    )
}

pub fn ensure_transition(from: BookingStatus, to: BookingStatus) -> Result<(), AppError> {
    if is_legal_transition(from, to) {
        Ok(())
    } else {
        Err(AppError::IllegalTransition(format!("{} -> {} is not allowed", from, to)))
    }
}

/// Gatekeeper for lifecycle moves: validates against the transition table
/// and hands the resulting domain event to the notifier. Event publication
/// is best-effort; an accepted transition is never rolled back because a
/// notifier failed.
pub struct StatusLifecycleManager {
    notifier: Arc<dyn Notifier>,
}

impl StatusLifecycleManager {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn ensure(&self, from: BookingStatus, to: BookingStatus) -> Result<(), AppError> {
        ensure_transition(from, to)
    }

    pub async fn emit(&self, event: DomainEvent) {
        if let Err(e) = self.notifier.publish(event.clone()).await {
            error!("Failed to publish domain event {:?}: {:?}", event, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_legal_transitions() {
        assert!(is_legal_transition(Pending, Confirmed));
        assert!(is_legal_transition(Pending, Cancelled));
        assert!(is_legal_transition(Pending, Expired));
        assert!(is_legal_transition(Confirmed, OnSite));
        assert!(is_legal_transition(Confirmed, Cancelled));
        assert!(is_legal_transition(Confirmed, Expired));
        assert!(is_legal_transition(OnSite, Completed));
    }

    #[test]
    fn test_skipping_confirmation_is_illegal() {
        assert!(!is_legal_transition(Pending, OnSite));
        assert!(!is_legal_transition(Pending, Completed));
    }

    #[test]
    fn test_on_site_can_only_complete() {
        assert!(!is_legal_transition(OnSite, Cancelled));
        assert!(!is_legal_transition(OnSite, Expired));
        assert!(!is_legal_transition(OnSite, Pending));
    }

    #[test]
    fn test_terminal_states_are_dead_ends() {
        for terminal in [Cancelled, Completed, Expired] {
            for target in [Pending, Confirmed, OnSite, Cancelled, Completed, Expired] {
                assert!(!is_legal_transition(terminal, target), "{} -> {} should be illegal", terminal, target);
            }
        }
    }

    #[test]
    fn test_nothing_returns_to_pending() {
        for from in [Confirmed, OnSite, Cancelled, Completed, Expired] {
            assert!(!is_legal_transition(from, Pending));
        }
    }
}
