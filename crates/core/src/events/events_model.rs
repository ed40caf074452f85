use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain_event::{DomainEvent, EventCategory};
use super::events_router::EventAction;
use crate::jobs::Priority;

/// Immutable audit record written for every emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub organization_id: String,
    pub actor_user_id: Option<String>,
    pub event_type: String,
    pub priority: Priority,
    pub category: EventCategory,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

/// Input to [`EventServiceTrait::emit`](super::EventServiceTrait::emit).
#[derive(Debug, Clone)]
pub struct EmitRequest {
    pub event: DomainEvent,
    pub organization_id: String,
    pub actor_user_id: Option<String>,
    pub category: Option<EventCategory>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl EmitRequest {
    pub fn new(event: DomainEvent, organization_id: impl Into<String>) -> Self {
        Self {
            event,
            organization_id: organization_id.into(),
            actor_user_id: None,
            category: None,
            occurred_at: None,
        }
    }

    pub fn with_actor(mut self, user_id: impl Into<String>) -> Self {
        self.actor_user_id = Some(user_id.into());
        self
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_timestamp(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Outcome of a single emit.
///
/// `processed` is false when the event was not routed or dispatch failed;
/// the audit record exists either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitResult {
    pub event_id: String,
    pub priority: Priority,
    pub action: Option<EventAction>,
    pub processed: bool,
}

/// Filter for [`EventRepositoryTrait::get_recent`](super::EventRepositoryTrait::get_recent).
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub organization_id: String,
    pub limit: i64,
    pub event_type: Option<String>,
}
