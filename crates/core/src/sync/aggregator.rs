//! Fan-in barrier over the initial syncs of every connected platform.
//!
//! Each platform sync completion re-derives "all connected platforms finished
//! their initial sync" from current state. Nothing is counted, so redelivered
//! completions and platforms (dis)connecting between syncs need no special
//! handling. The analytics trigger ledger makes sure only one of several
//! completions observing the open barrier submits the analytics job.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sync_request_model::{
    AnalyticsJobPayload, AnalyticsTriggerLedgerTrait, SyncCompletionContext,
};
use super::sync_session_model::SyncSessionRepositoryTrait;
use crate::constants::PROFIT_ANALYTICS_HANDLER;
use crate::errors::{require_non_empty, Result};
use crate::jobs::{CompletionHandler, Job, JobCompletion, JobEngine, JobOutcome, Priority};
use crate::organizations::OrganizationStateTrait;
use crate::platforms::{ConnectedPlatformsTrait, Platform};

/// Result of one barrier evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum BarrierDecision {
    NoConnectedPlatforms,
    Waiting {
        completed: Vec<Platform>,
        connected: Vec<Platform>,
    },
    /// All synced but onboarding is incomplete; the onboarding event re-runs this.
    DeferredToOnboarding,
    /// Another completion already submitted analytics for this platform set.
    AlreadyTriggered,
    AnalyticsSubmitted {
        job_id: String,
        include_historical_costs: bool,
    },
}

/// Deterministic ledger key for the initial-sync analytics run.
pub fn initial_sync_trigger_key(organization_id: &str, platforms: &[Platform]) -> String {
    let mut names: Vec<&str> = platforms.iter().map(|p| p.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    format!("initial-sync:{}:{}", organization_id, names.join(","))
}

pub struct SyncCompletionAggregator {
    engine: Arc<dyn JobEngine>,
    connections: Arc<dyn ConnectedPlatformsTrait>,
    sessions: Arc<dyn SyncSessionRepositoryTrait>,
    organizations: Arc<dyn OrganizationStateTrait>,
    ledger: Arc<dyn AnalyticsTriggerLedgerTrait>,
}

impl SyncCompletionAggregator {
    pub fn new(
        engine: Arc<dyn JobEngine>,
        connections: Arc<dyn ConnectedPlatformsTrait>,
        sessions: Arc<dyn SyncSessionRepositoryTrait>,
        organizations: Arc<dyn OrganizationStateTrait>,
        ledger: Arc<dyn AnalyticsTriggerLedgerTrait>,
    ) -> Self {
        Self {
            engine,
            connections,
            sessions,
            organizations,
            ledger,
        }
    }

    /// Handle one platform sync completion.
    pub async fn on_sync_complete(
        &self,
        completion: JobCompletion<SyncCompletionContext>,
    ) -> Result<BarrierDecision> {
        let context = completion.context;
        match &completion.result {
            JobOutcome::Succeeded { .. } => debug!(
                "Sync job {} for {} ({}) succeeded",
                completion.work_id, context.organization_id, context.platform
            ),
            JobOutcome::Failed { error } => {
                warn!(
                    "Sync job {} for {} ({}) failed: {}",
                    completion.work_id, context.organization_id, context.platform, error
                );
                if let Some(session_id) = &context.session_id {
                    self.fail_open_session(session_id, error).await?;
                }
            }
        }
        self.evaluate_at(&context.organization_id, Utc::now()).await
    }

    /// A job that died without closing its session leaves it open; close it.
    async fn fail_open_session(&self, session_id: &str, error: &str) -> Result<()> {
        let Some(mut session) = self.sessions.get_by_id(session_id)? else {
            return Ok(());
        };
        if session.status.is_terminal() {
            return Ok(());
        }
        session.fail(error.to_string(), Utc::now())?;
        self.sessions.update(session).await?;
        Ok(())
    }

    /// Re-evaluate the barrier for an organization.
    pub async fn evaluate(&self, organization_id: &str) -> Result<BarrierDecision> {
        self.evaluate_at(organization_id, Utc::now()).await
    }

    pub async fn evaluate_at(
        &self,
        organization_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BarrierDecision> {
        require_non_empty("organizationId", organization_id)?;

        let connected = self.connections.list_connected_platforms(organization_id)?;
        if connected.is_empty() {
            debug!("Organization {} has no connected platforms", organization_id);
            return Ok(BarrierDecision::NoConnectedPlatforms);
        }

        let mut completed = Vec::with_capacity(connected.len());
        for platform in &connected {
            if self
                .sessions
                .has_completed_initial_sync(organization_id, *platform)?
            {
                completed.push(*platform);
            }
        }

        if completed.len() != connected.len() {
            debug!(
                "Organization {}: initial sync done for {:?} of {:?}",
                organization_id, completed, connected
            );
            return Ok(BarrierDecision::Waiting {
                completed,
                connected,
            });
        }

        if !self.organizations.is_onboarding_complete(organization_id)? {
            info!(
                "Organization {}: all platforms synced, analytics deferred until onboarding completes",
                organization_id
            );
            return Ok(BarrierDecision::DeferredToOnboarding);
        }

        let include_historical_costs = self.organizations.has_historical_costs(organization_id)?;

        let key = initial_sync_trigger_key(organization_id, &connected);
        if !self.ledger.claim(&key, organization_id, now).await? {
            debug!("Analytics already triggered for {}", key);
            return Ok(BarrierDecision::AlreadyTriggered);
        }

        let payload = serde_json::to_value(AnalyticsJobPayload {
            organization_id: organization_id.to_string(),
            include_historical_costs,
            platforms: connected,
        })?;
        let job = Job::<()>::new(PROFIT_ANALYTICS_HANDLER, Priority::High, payload)
            .into_descriptor()?;

        let job_id = match self.engine.submit(job).await {
            Ok(job_id) => job_id,
            Err(e) => {
                // Let a later completion retry.
                if let Err(release_err) = self.ledger.release(&key).await {
                    warn!("Failed to release trigger {}: {}", key, release_err);
                }
                return Err(e);
            }
        };
        self.ledger.attach_job(&key, &job_id).await?;

        info!(
            "Organization {}: all platforms synced, analytics job {} submitted (historical costs: {})",
            organization_id, job_id, include_historical_costs
        );
        Ok(BarrierDecision::AnalyticsSubmitted {
            job_id,
            include_historical_costs,
        })
    }
}

impl SyncCompletionAggregator {
    /// On-demand analytics run. Not gated by the barrier or the ledger.
    pub async fn request_analytics(
        &self,
        organization_id: &str,
        include_historical_costs: Option<bool>,
    ) -> Result<String> {
        require_non_empty("organizationId", organization_id)?;
        let include_historical_costs = match include_historical_costs {
            Some(flag) => flag,
            None => self.organizations.has_historical_costs(organization_id)?,
        };
        let payload = serde_json::to_value(AnalyticsJobPayload {
            organization_id: organization_id.to_string(),
            include_historical_costs,
            platforms: self.connections.list_connected_platforms(organization_id)?,
        })?;
        let job = Job::<()>::new(PROFIT_ANALYTICS_HANDLER, Priority::High, payload)
            .into_descriptor()?;
        self.engine.submit(job).await
    }
}

#[async_trait]
impl CompletionHandler for SyncCompletionAggregator {
    async fn on_complete(&self, completion: JobCompletion<Value>) -> Result<()> {
        let completion = completion.decode::<SyncCompletionContext>()?;
        self.on_sync_complete(completion).await?;
        Ok(())
    }
}
