//! Job handlers run by the local engine.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use storepulse_core::errors::{JobError, Result};
use storepulse_core::events::{DomainEvent, EmitRequest, EventAction, EventServiceTrait};
use storepulse_core::sync::{
    SyncCompletionAggregator, SyncJobPayload, SyncSessionTracker, SyncStatus,
};

use crate::engine::JobHandler;

fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| JobError::InvalidContext(e.to_string()).into())
}

/// Drives a platform sync session through its lifecycle.
///
/// The per-platform fetch runs outside this process; locally the session is
/// walked to `completed` and the result announced as a domain event.
pub struct PlatformSyncHandler {
    tracker: Arc<SyncSessionTracker>,
    event_service: Arc<dyn EventServiceTrait>,
}

impl PlatformSyncHandler {
    pub fn new(tracker: Arc<SyncSessionTracker>, event_service: Arc<dyn EventServiceTrait>) -> Self {
        Self {
            tracker,
            event_service,
        }
    }

    async fn run_session(&self, job: &SyncJobPayload) -> Result<()> {
        self.tracker
            .advance(&job.session_id, SyncStatus::Processing)
            .await?;
        self.tracker
            .advance(&job.session_id, SyncStatus::Syncing)
            .await?;
        self.tracker
            .advance(&job.session_id, SyncStatus::Completed)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl JobHandler for PlatformSyncHandler {
    async fn run(&self, work_id: &str, payload: Value) -> Result<Value> {
        let job: SyncJobPayload = decode(payload)?;
        tracing::info!(
            "Job {}: {} sync of {} for organization {}",
            work_id,
            job.sync_type.as_str(),
            job.platform,
            job.organization_id
        );

        if let Err(e) = self.run_session(&job).await {
            if let Err(fail_err) = self.tracker.fail(&job.session_id, e.to_string()).await {
                tracing::warn!("Could not fail session {}: {}", job.session_id, fail_err);
            }
            let event = DomainEvent::SyncFailed {
                platform: job.platform,
                session_id: Some(job.session_id.clone()),
                error: e.to_string(),
            };
            if let Err(emit_err) = self
                .event_service
                .emit(EmitRequest::new(event, job.organization_id.clone()))
                .await
            {
                tracing::warn!("Could not record sync failure: {}", emit_err);
            }
            return Err(e);
        }

        let event = DomainEvent::SyncCompleted {
            platform: job.platform,
            session_id: job.session_id.clone(),
        };
        self.event_service
            .emit(EmitRequest::new(event, job.organization_id.clone()))
            .await?;

        Ok(json!({ "sessionId": job.session_id, "status": SyncStatus::Completed.as_str() }))
    }
}

/// Shape of the payload the event dispatcher submits.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DispatchedEvent {
    event_id: String,
    organization_id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    payload: Value,
}

/// Handles `analytics_requested` and `onboarding_completed`.
///
/// Onboarding completion re-evaluates the initial-sync barrier, which may
/// have deferred analytics. An explicit request always submits a run.
pub struct ComputeAnalyticsHandler {
    aggregator: Arc<SyncCompletionAggregator>,
}

impl ComputeAnalyticsHandler {
    pub fn new(aggregator: Arc<SyncCompletionAggregator>) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl JobHandler for ComputeAnalyticsHandler {
    async fn run(&self, _work_id: &str, payload: Value) -> Result<Value> {
        let dispatched: DispatchedEvent = decode(payload)?;
        let event = DomainEvent::from_parts(&dispatched.event_type, dispatched.payload)?;
        match event {
            DomainEvent::AnalyticsRequested {
                include_historical_costs,
            } => {
                let job_id = self
                    .aggregator
                    .request_analytics(&dispatched.organization_id, include_historical_costs)
                    .await?;
                Ok(json!({ "analyticsJobId": job_id }))
            }
            DomainEvent::OnboardingCompleted {} => {
                let decision = self.aggregator.evaluate(&dispatched.organization_id).await?;
                Ok(serde_json::to_value(decision)?)
            }
            other => Err(JobError::InvalidContext(format!(
                "event {} of type {} does not request analytics",
                dispatched.event_id,
                other.event_type()
            ))
            .into()),
        }
    }
}

/// Acknowledges work whose executor lives outside this process.
pub struct AcknowledgeHandler {
    name: &'static str,
}

impl AcknowledgeHandler {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl JobHandler for AcknowledgeHandler {
    async fn run(&self, work_id: &str, payload: Value) -> Result<Value> {
        tracing::debug!("Job {} acknowledged by {}: {}", work_id, self.name, payload);
        Ok(json!({ "acknowledged": self.name }))
    }
}

/// Routed actions without a local executor.
pub const ACKNOWLEDGED_ACTIONS: [EventAction; 6] = [
    EventAction::UpdateActivityProfile,
    EventAction::RecalculateMetrics,
    EventAction::HandleSyncFailure,
    EventAction::HandleDisconnection,
    EventAction::RecordRateLimit,
    EventAction::InvalidateCache,
];
