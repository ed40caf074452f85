//! Domain event types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{Result, ValidationError};
use crate::jobs::Priority;
use crate::platforms::Platform;

/// Every event kind the router knows about.
///
/// Adding a kind forces a priority, category and routing decision because
/// each of those is an exhaustive `match` over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UserLoggedIn,
    UserActive,
    OrderCreated,
    OrderUpdated,
    OrderRefunded,
    ProductCostUpdated,
    AdSpendUpdated,
    PlatformConnected,
    PlatformDisconnected,
    SyncCompleted,
    SyncFailed,
    RateLimitReached,
    AnalyticsRequested,
    OnboardingCompleted,
    SettingsChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 15] = [
        EventKind::UserLoggedIn,
        EventKind::UserActive,
        EventKind::OrderCreated,
        EventKind::OrderUpdated,
        EventKind::OrderRefunded,
        EventKind::ProductCostUpdated,
        EventKind::AdSpendUpdated,
        EventKind::PlatformConnected,
        EventKind::PlatformDisconnected,
        EventKind::SyncCompleted,
        EventKind::SyncFailed,
        EventKind::RateLimitReached,
        EventKind::AnalyticsRequested,
        EventKind::OnboardingCompleted,
        EventKind::SettingsChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserLoggedIn => "user_logged_in",
            EventKind::UserActive => "user_active",
            EventKind::OrderCreated => "order_created",
            EventKind::OrderUpdated => "order_updated",
            EventKind::OrderRefunded => "order_refunded",
            EventKind::ProductCostUpdated => "product_cost_updated",
            EventKind::AdSpendUpdated => "ad_spend_updated",
            EventKind::PlatformConnected => "platform_connected",
            EventKind::PlatformDisconnected => "platform_disconnected",
            EventKind::SyncCompleted => "sync_completed",
            EventKind::SyncFailed => "sync_failed",
            EventKind::RateLimitReached => "rate_limit_reached",
            EventKind::AnalyticsRequested => "analytics_requested",
            EventKind::OnboardingCompleted => "onboarding_completed",
            EventKind::SettingsChanged => "settings_changed",
        }
    }

    /// Static priority table.
    pub fn priority(&self) -> Priority {
        match self {
            EventKind::PlatformDisconnected | EventKind::SyncFailed => Priority::Critical,
            EventKind::OrderCreated
            | EventKind::OrderRefunded
            | EventKind::RateLimitReached
            | EventKind::AnalyticsRequested
            | EventKind::OnboardingCompleted => Priority::High,
            EventKind::OrderUpdated
            | EventKind::ProductCostUpdated
            | EventKind::AdSpendUpdated
            | EventKind::PlatformConnected
            | EventKind::SyncCompleted => Priority::Normal,
            EventKind::UserLoggedIn | EventKind::UserActive | EventKind::SettingsChanged => {
                Priority::Low
            }
        }
    }

    pub fn default_category(&self) -> EventCategory {
        match self {
            EventKind::OrderCreated
            | EventKind::OrderUpdated
            | EventKind::OrderRefunded
            | EventKind::ProductCostUpdated
            | EventKind::AdSpendUpdated => EventCategory::Commerce,
            EventKind::PlatformConnected
            | EventKind::PlatformDisconnected
            | EventKind::SyncCompleted
            | EventKind::SyncFailed
            | EventKind::RateLimitReached => EventCategory::Integration,
            EventKind::UserLoggedIn | EventKind::UserActive => EventCategory::Engagement,
            EventKind::AnalyticsRequested
            | EventKind::OnboardingCompleted
            | EventKind::SettingsChanged => EventCategory::System,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Coarse grouping stored on every event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Commerce,
    Integration,
    Engagement,
    System,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Commerce => "commerce",
            EventCategory::Integration => "integration",
            EventCategory::Engagement => "engagement",
            EventCategory::System => "system",
        }
    }

    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "commerce" => EventCategory::Commerce,
            "integration" => EventCategory::Integration,
            "engagement" => EventCategory::Engagement,
            _ => EventCategory::System,
        }
    }
}

/// A business event with its typed payload.
///
/// `Unrecognized` carries any type string this build does not know yet; it is
/// persisted like every other event, gets `Normal` priority and is never routed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DomainEvent {
    UserLoggedIn {},

    UserActive {
        #[serde(default)]
        feature: Option<String>,
    },

    OrderCreated {
        order_id: String,
        total: Decimal,
        currency: String,
    },

    OrderUpdated {
        order_id: String,
    },

    OrderRefunded {
        order_id: String,
        amount: Decimal,
        currency: String,
    },

    ProductCostUpdated {
        product_id: String,
    },

    /// Ad spend imported for a platform and day (`YYYY-MM-DD`).
    AdSpendUpdated {
        platform: Platform,
        date: String,
    },

    PlatformConnected {
        platform: Platform,
        #[serde(default)]
        account_id: Option<String>,
    },

    PlatformDisconnected {
        platform: Platform,
        #[serde(default)]
        reason: Option<String>,
    },

    SyncCompleted {
        platform: Platform,
        session_id: String,
    },

    SyncFailed {
        platform: Platform,
        #[serde(default)]
        session_id: Option<String>,
        error: String,
    },

    RateLimitReached {
        platform: Platform,
        #[serde(default)]
        retry_after_secs: Option<u64>,
    },

    AnalyticsRequested {
        #[serde(default)]
        include_historical_costs: Option<bool>,
    },

    OnboardingCompleted {},

    SettingsChanged {
        #[serde(default)]
        keys: Vec<String>,
    },

    #[serde(skip)]
    Unrecognized { event_type: String, payload: Value },
}

impl DomainEvent {
    /// Builds an event from a raw type string and open payload map.
    ///
    /// Unknown types become `Unrecognized`; a known type with a payload that
    /// does not match its shape is a validation error.
    pub fn from_parts(event_type: &str, payload: Value) -> Result<Self> {
        let payload = match payload {
            Value::Null => json!({}),
            other => other,
        };

        if EventKind::from_str(event_type).is_err() {
            return Ok(DomainEvent::Unrecognized {
                event_type: event_type.to_string(),
                payload,
            });
        }

        serde_json::from_value(json!({ "type": event_type, "payload": payload })).map_err(|e| {
            ValidationError::MalformedPayload {
                event_type: event_type.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// The known kind, or `None` for unrecognized events.
    pub fn kind(&self) -> Option<EventKind> {
        let kind = match self {
            DomainEvent::UserLoggedIn {} => EventKind::UserLoggedIn,
            DomainEvent::UserActive { .. } => EventKind::UserActive,
            DomainEvent::OrderCreated { .. } => EventKind::OrderCreated,
            DomainEvent::OrderUpdated { .. } => EventKind::OrderUpdated,
            DomainEvent::OrderRefunded { .. } => EventKind::OrderRefunded,
            DomainEvent::ProductCostUpdated { .. } => EventKind::ProductCostUpdated,
            DomainEvent::AdSpendUpdated { .. } => EventKind::AdSpendUpdated,
            DomainEvent::PlatformConnected { .. } => EventKind::PlatformConnected,
            DomainEvent::PlatformDisconnected { .. } => EventKind::PlatformDisconnected,
            DomainEvent::SyncCompleted { .. } => EventKind::SyncCompleted,
            DomainEvent::SyncFailed { .. } => EventKind::SyncFailed,
            DomainEvent::RateLimitReached { .. } => EventKind::RateLimitReached,
            DomainEvent::AnalyticsRequested { .. } => EventKind::AnalyticsRequested,
            DomainEvent::OnboardingCompleted {} => EventKind::OnboardingCompleted,
            DomainEvent::SettingsChanged { .. } => EventKind::SettingsChanged,
            DomainEvent::Unrecognized { .. } => return None,
        };
        Some(kind)
    }

    /// Type string as persisted on the event record.
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::Unrecognized { event_type, .. } => event_type.as_str(),
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Resolved priority; types absent from the table are `Normal`.
    pub fn priority(&self) -> Priority {
        self.kind().map(|k| k.priority()).unwrap_or(Priority::Normal)
    }

    pub fn default_category(&self) -> EventCategory {
        self.kind()
            .map(|k| k.default_category())
            .unwrap_or(EventCategory::System)
    }

    /// The payload as an open JSON map, without the type tag.
    pub fn payload(&self) -> Result<Value> {
        if let DomainEvent::Unrecognized { payload, .. } = self {
            return Ok(payload.clone());
        }
        let mut tagged = serde_json::to_value(self)?;
        Ok(tagged
            .get_mut("payload")
            .map(Value::take)
            .unwrap_or_else(|| json!({})))
    }

    pub fn platform_disconnected(platform: Platform, reason: Option<String>) -> Self {
        Self::PlatformDisconnected { platform, reason }
    }

    pub fn onboarding_completed() -> Self {
        Self::OnboardingCompleted {}
    }
}
