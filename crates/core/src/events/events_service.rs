use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use uuid::Uuid;

use super::events_model::{EmitRequest, EmitResult, EventQuery, EventRecord};
use super::events_router::route;
use super::events_traits::{EventDispatcherTrait, EventRepositoryTrait, EventServiceTrait};
use crate::constants::{DEFAULT_EVENT_QUERY_LIMIT, MAX_EVENT_QUERY_LIMIT};
use crate::errors::{require_non_empty, Result};

pub struct EventService {
    repository: Arc<dyn EventRepositoryTrait>,
    dispatcher: Arc<dyn EventDispatcherTrait>,
}

impl EventService {
    pub fn new(
        repository: Arc<dyn EventRepositoryTrait>,
        dispatcher: Arc<dyn EventDispatcherTrait>,
    ) -> Self {
        EventService {
            repository,
            dispatcher,
        }
    }

    fn validate(request: &EmitRequest) -> Result<()> {
        require_non_empty("organizationId", &request.organization_id)?;
        if let Some(actor) = &request.actor_user_id {
            require_non_empty("actorUserId", actor)?;
        }
        Ok(())
    }

    fn build_record(request: &EmitRequest) -> Result<EventRecord> {
        let event = &request.event;
        Ok(EventRecord {
            id: Uuid::now_v7().to_string(),
            organization_id: request.organization_id.clone(),
            actor_user_id: request.actor_user_id.clone(),
            event_type: event.event_type().to_string(),
            priority: event.priority(),
            category: request.category.unwrap_or_else(|| event.default_category()),
            payload: event.payload()?,
            created_at: request.occurred_at.unwrap_or_else(Utc::now),
        })
    }

    async fn persist_and_route(&self, request: EmitRequest) -> Result<EmitResult> {
        let record = Self::build_record(&request)?;
        let record = self.repository.insert(record).await?;

        let Some(action) = route(&request.event) else {
            warn!(
                "Dropping unrecognized event type '{}' (event {})",
                record.event_type, record.id
            );
            return Ok(EmitResult {
                event_id: record.id,
                priority: record.priority,
                action: None,
                processed: false,
            });
        };

        let processed = match self
            .dispatcher
            .dispatch(&record, &request.event, action)
            .await
        {
            Ok(()) => {
                debug!(
                    "Event {} ({}) dispatched to {}",
                    record.id,
                    record.event_type,
                    action.handler_ref()
                );
                true
            }
            Err(e) => {
                warn!(
                    "Dispatch of event {} ({}) failed, audit record kept: {}",
                    record.id, record.event_type, e
                );
                false
            }
        };

        Ok(EmitResult {
            event_id: record.id,
            priority: record.priority,
            action: Some(action),
            processed,
        })
    }
}

#[async_trait]
impl EventServiceTrait for EventService {
    async fn emit(&self, request: EmitRequest) -> Result<EmitResult> {
        Self::validate(&request)?;
        self.persist_and_route(request).await
    }

    async fn emit_batch(&self, requests: Vec<EmitRequest>) -> Result<Vec<EmitResult>> {
        // Reject the whole batch before anything is written.
        for request in &requests {
            Self::validate(request)?;
        }

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.persist_and_route(request).await?);
        }
        Ok(results)
    }

    fn get_recent_events(
        &self,
        organization_id: &str,
        limit: Option<i64>,
        event_type: Option<String>,
    ) -> Result<Vec<EventRecord>> {
        require_non_empty("organizationId", organization_id)?;
        let limit = limit
            .unwrap_or(DEFAULT_EVENT_QUERY_LIMIT)
            .clamp(1, MAX_EVENT_QUERY_LIMIT);
        self.repository.get_recent(&EventQuery {
            organization_id: organization_id.to_string(),
            limit,
            event_type: event_type.filter(|t| !t.is_empty()),
        })
    }
}
