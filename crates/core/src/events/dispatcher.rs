use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::domain_event::DomainEvent;
use super::events_model::EventRecord;
use super::events_router::EventAction;
use super::events_traits::EventDispatcherTrait;
use crate::errors::Result;
use crate::jobs::{Job, JobEngine};

/// Dispatches routed events as jobs on the shared engine.
///
/// One job per event, at the event's priority, handled by the action's
/// handler. No completion callback is attached.
pub struct JobEventDispatcher {
    engine: Arc<dyn JobEngine>,
}

impl JobEventDispatcher {
    pub fn new(engine: Arc<dyn JobEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventDispatcherTrait for JobEventDispatcher {
    async fn dispatch(
        &self,
        record: &EventRecord,
        _event: &DomainEvent,
        action: EventAction,
    ) -> Result<()> {
        let payload = json!({
            "eventId": record.id,
            "organizationId": record.organization_id,
            "actorUserId": record.actor_user_id,
            "type": record.event_type,
            "category": record.category,
            "payload": record.payload,
        });
        let job = Job::<()>::new(action.handler_ref(), record.priority, payload).into_descriptor()?;
        self.engine.submit(job).await?;
        Ok(())
    }
}
