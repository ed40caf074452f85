//! Pure mapping from event kind to downstream action.

use serde::{Deserialize, Serialize};

use super::domain_event::{DomainEvent, EventKind};

/// The fixed set of downstream actions an event can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    UpdateActivityProfile,
    RecalculateMetrics,
    HandleSyncFailure,
    HandleDisconnection,
    RecordRateLimit,
    ComputeAnalytics,
    InvalidateCache,
}

impl EventAction {
    /// Job handler that performs this action.
    pub fn handler_ref(&self) -> &'static str {
        match self {
            EventAction::UpdateActivityProfile => "events.update_activity_profile",
            EventAction::RecalculateMetrics => "events.recalculate_metrics",
            EventAction::HandleSyncFailure => "events.handle_sync_failure",
            EventAction::HandleDisconnection => "events.handle_disconnection",
            EventAction::RecordRateLimit => "events.record_rate_limit",
            EventAction::ComputeAnalytics => "events.compute_analytics",
            EventAction::InvalidateCache => "events.invalidate_cache",
        }
    }
}

impl EventKind {
    pub fn action(&self) -> EventAction {
        match self {
            EventKind::UserLoggedIn | EventKind::UserActive => EventAction::UpdateActivityProfile,
            EventKind::OrderCreated
            | EventKind::OrderUpdated
            | EventKind::OrderRefunded
            | EventKind::AdSpendUpdated => EventAction::RecalculateMetrics,
            EventKind::SyncFailed => EventAction::HandleSyncFailure,
            EventKind::PlatformDisconnected => EventAction::HandleDisconnection,
            EventKind::RateLimitReached => EventAction::RecordRateLimit,
            EventKind::AnalyticsRequested | EventKind::OnboardingCompleted => {
                EventAction::ComputeAnalytics
            }
            EventKind::ProductCostUpdated
            | EventKind::PlatformConnected
            | EventKind::SyncCompleted
            | EventKind::SettingsChanged => EventAction::InvalidateCache,
        }
    }
}

/// Returns the action for `event`, or `None` for unrecognized types.
pub fn route(event: &DomainEvent) -> Option<EventAction> {
    event.kind().map(|kind| kind.action())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::Platform;
    use serde_json::json;

    #[test]
    fn test_every_kind_routes_somewhere() {
        for kind in EventKind::ALL {
            assert!(kind.action().handler_ref().starts_with("events."));
        }
    }

    #[test]
    fn test_route_examples() {
        assert_eq!(
            route(&DomainEvent::platform_disconnected(Platform::Shopify, None)),
            Some(EventAction::HandleDisconnection)
        );
        assert_eq!(
            route(&DomainEvent::onboarding_completed()),
            Some(EventAction::ComputeAnalytics)
        );
        assert_eq!(
            route(&DomainEvent::UserActive { feature: None }),
            Some(EventAction::UpdateActivityProfile)
        );
    }

    #[test]
    fn test_unrecognized_is_not_routed() {
        let event = DomainEvent::from_parts("loyalty_points_awarded", json!({})).unwrap();
        assert_eq!(route(&event), None);
    }
}
