//! Creates platform sync jobs with a completion callback attached.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::sync_request_model::{
    SyncCompletionContext, SyncDebouncePolicy, SyncJobPayload, SyncRequest,
    SyncRequestRepositoryTrait, SyncTrigger, SyncTriggerOutcome,
};
use super::sync_session_model::{SyncSession, SyncSessionRepositoryTrait, SyncType};
use crate::constants::{PLATFORM_SYNC_HANDLER, SYNC_COMPLETION_HANDLER};
use crate::errors::{require_non_empty, Result};
use crate::jobs::{Job, JobEngine};

/// Trait for sync orchestration
#[async_trait]
pub trait SyncOrchestratorTrait: Send + Sync {
    async fn trigger_sync(&self, trigger: SyncTrigger) -> Result<SyncTriggerOutcome>;
}

pub struct SyncJobOrchestrator {
    engine: Arc<dyn JobEngine>,
    sessions: Arc<dyn SyncSessionRepositoryTrait>,
    requests: Arc<dyn SyncRequestRepositoryTrait>,
    policy: SyncDebouncePolicy,
}

impl SyncJobOrchestrator {
    pub fn new(
        engine: Arc<dyn JobEngine>,
        sessions: Arc<dyn SyncSessionRepositoryTrait>,
        requests: Arc<dyn SyncRequestRepositoryTrait>,
        policy: SyncDebouncePolicy,
    ) -> Self {
        Self {
            engine,
            sessions,
            requests,
            policy,
        }
    }

    /// Returns an outcome when a debounce rule suppresses the trigger.
    fn debounce(
        &self,
        trigger: &SyncTrigger,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncTriggerOutcome>> {
        if let Some(account_id) = &trigger.account_id {
            let recent = self.sessions.latest_non_failed_for_account(
                &trigger.organization_id,
                trigger.platform,
                account_id,
            )?;
            if let Some(session) = recent {
                if session.started_at > now - self.policy.account_cooldown {
                    info!(
                        "Skipping {} sync for account {}: last synced at {}",
                        trigger.platform, account_id, session.started_at
                    );
                    return Ok(Some(SyncTriggerOutcome {
                        job_id: None,
                        session_id: Some(session.id),
                        sync_type: Some(session.sync_type),
                        skipped: true,
                        deduplicated: false,
                    }));
                }
            }
        }

        let earlier = self.requests.find_latest_since(
            &trigger.organization_id,
            trigger.platform,
            now - self.policy.request_window,
        )?;
        if let Some(request) = earlier {
            debug!(
                "Reusing job {} for repeated {} sync request (org {})",
                request.job_id, trigger.platform, trigger.organization_id
            );
            return Ok(Some(SyncTriggerOutcome {
                job_id: Some(request.job_id),
                session_id: request.session_id,
                sync_type: None,
                skipped: false,
                deduplicated: true,
            }));
        }

        Ok(None)
    }

    fn resolve_sync_type(&self, trigger: &SyncTrigger) -> Result<SyncType> {
        if let Some(forced) = trigger.sync_type {
            return Ok(forced);
        }
        let initial_done = self
            .sessions
            .has_completed_initial_sync(&trigger.organization_id, trigger.platform)?;
        Ok(if initial_done {
            SyncType::Incremental
        } else {
            SyncType::Initial
        })
    }

    pub async fn trigger_sync_at(
        &self,
        trigger: SyncTrigger,
        now: DateTime<Utc>,
    ) -> Result<SyncTriggerOutcome> {
        require_non_empty("organizationId", &trigger.organization_id)?;
        if let Some(account_id) = &trigger.account_id {
            require_non_empty("accountId", account_id)?;
        }

        if let Some(outcome) = self.debounce(&trigger, now)? {
            return Ok(outcome);
        }

        let sync_type = self.resolve_sync_type(&trigger)?;
        let session = SyncSession::pending(
            trigger.organization_id.clone(),
            trigger.platform,
            trigger.account_id.clone(),
            sync_type,
            trigger.date_range,
            now,
        );
        let mut session = self.sessions.create(session).await?;

        let payload = serde_json::to_value(SyncJobPayload {
            organization_id: trigger.organization_id.clone(),
            platform: trigger.platform,
            session_id: session.id.clone(),
            sync_type,
            account_id: trigger.account_id.clone(),
            date_range: trigger.date_range,
        })?;
        let context = SyncCompletionContext {
            organization_id: trigger.organization_id.clone(),
            platform: trigger.platform,
            session_id: Some(session.id.clone()),
        };
        let job = Job::new(PLATFORM_SYNC_HANDLER, trigger.priority, payload)
            .on_complete(SYNC_COMPLETION_HANDLER, context)
            .into_descriptor()?;

        let job_id = match self.engine.submit(job).await {
            Ok(job_id) => job_id,
            Err(e) => {
                warn!(
                    "Failed to submit {} sync for organization {}: {}",
                    trigger.platform, trigger.organization_id, e
                );
                if session.fail(e.to_string(), Utc::now()).is_ok() {
                    self.sessions.update(session).await?;
                }
                return Err(e);
            }
        };

        self.sessions.set_job_id(&session.id, &job_id).await?;
        self.requests
            .record(SyncRequest {
                organization_id: trigger.organization_id.clone(),
                platform: trigger.platform,
                job_id: job_id.clone(),
                session_id: Some(session.id.clone()),
                requested_at: now,
            })
            .await?;

        info!(
            "Submitted {} {} sync job {} for organization {}",
            sync_type.as_str(),
            trigger.platform,
            job_id,
            trigger.organization_id
        );

        Ok(SyncTriggerOutcome {
            job_id: Some(job_id),
            session_id: Some(session.id),
            sync_type: Some(sync_type),
            skipped: false,
            deduplicated: false,
        })
    }
}

#[async_trait]
impl SyncOrchestratorTrait for SyncJobOrchestrator {
    async fn trigger_sync(&self, trigger: SyncTrigger) -> Result<SyncTriggerOutcome> {
        self.trigger_sync_at(trigger, Utc::now()).await
    }
}
