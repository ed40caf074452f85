use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain_event::DomainEvent;
use super::events_model::{EmitRequest, EmitResult, EventQuery, EventRecord};
use super::events_router::EventAction;
use crate::errors::Result;

/// Trait for event record persistence
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    async fn insert(&self, record: EventRecord) -> Result<EventRecord>;

    /// Most recent first.
    fn get_recent(&self, query: &EventQuery) -> Result<Vec<EventRecord>>;

    /// Deletes at most `limit` records created strictly before `cutoff`, oldest first.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<usize>;
}

/// Hands a routed event to whatever performs `action`.
#[async_trait]
pub trait EventDispatcherTrait: Send + Sync {
    async fn dispatch(
        &self,
        record: &EventRecord,
        event: &DomainEvent,
        action: EventAction,
    ) -> Result<()>;
}

/// Trait for event service operations
#[async_trait]
pub trait EventServiceTrait: Send + Sync {
    async fn emit(&self, request: EmitRequest) -> Result<EmitResult>;

    /// Persist-then-route per request, in input order.
    async fn emit_batch(&self, requests: Vec<EmitRequest>) -> Result<Vec<EmitResult>>;

    fn get_recent_events(
        &self,
        organization_id: &str,
        limit: Option<i64>,
        event_type: Option<String>,
    ) -> Result<Vec<EventRecord>>;
}
