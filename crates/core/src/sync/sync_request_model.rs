//! Sync trigger inputs, debounce log and completion context.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::sync_session_model::{DateRange, SyncType};
use crate::constants::{ACCOUNT_SYNC_COOLDOWN_SECS, SYNC_REQUEST_WINDOW_SECS};
use crate::errors::Result;
use crate::jobs::Priority;
use crate::platforms::Platform;

/// A request to sync one platform for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTrigger {
    pub organization_id: String,
    pub platform: Platform,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub priority: Priority,
    /// Forces the sync type instead of deriving initial/incremental.
    #[serde(default)]
    pub sync_type: Option<SyncType>,
}

impl SyncTrigger {
    pub fn new(organization_id: impl Into<String>, platform: Platform) -> Self {
        Self {
            organization_id: organization_id.into(),
            platform,
            account_id: None,
            date_range: None,
            priority: Priority::Normal,
            sync_type: None,
        }
    }

    pub fn for_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

/// What `trigger_sync` did.
///
/// `skipped` means the account cooldown suppressed the request and no job was
/// created. `deduplicated` means the request window matched and `job_id` is the
/// earlier job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTriggerOutcome {
    pub job_id: Option<String>,
    pub session_id: Option<String>,
    pub sync_type: Option<SyncType>,
    pub skipped: bool,
    pub deduplicated: bool,
}

/// Debounce windows applied before a sync job is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncDebouncePolicy {
    /// Skip when the same account synced more recently than this
    pub account_cooldown: Duration,
    /// Reuse the earlier job when the org/platform was requested within this
    pub request_window: Duration,
}

impl Default for SyncDebouncePolicy {
    fn default() -> Self {
        Self {
            account_cooldown: Duration::seconds(ACCOUNT_SYNC_COOLDOWN_SECS),
            request_window: Duration::seconds(SYNC_REQUEST_WINDOW_SECS),
        }
    }
}

/// Persisted record of a sync request, used by the request window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub organization_id: String,
    pub platform: Platform,
    pub job_id: String,
    pub session_id: Option<String>,
    pub requested_at: DateTime<Utc>,
}

/// Trait for the sync request log
#[async_trait]
pub trait SyncRequestRepositoryTrait: Send + Sync {
    async fn record(&self, request: SyncRequest) -> Result<SyncRequest>;

    /// Latest request for the org/platform at or after `since`.
    fn find_latest_since(
        &self,
        organization_id: &str,
        platform: Platform,
        since: DateTime<Utc>,
    ) -> Result<Option<SyncRequest>>;
}

/// Context attached to every platform sync job and handed back on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCompletionContext {
    pub organization_id: String,
    pub platform: Platform,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payload of the platform sync job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJobPayload {
    pub organization_id: String,
    pub platform: Platform,
    pub session_id: String,
    pub sync_type: SyncType,
    pub account_id: Option<String>,
    pub date_range: Option<DateRange>,
}

/// Payload of the profit analytics job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsJobPayload {
    pub organization_id: String,
    pub include_historical_costs: bool,
    pub platforms: Vec<Platform>,
}

/// Records which analytics runs have already been triggered.
#[async_trait]
pub trait AnalyticsTriggerLedgerTrait: Send + Sync {
    /// Insert-if-absent. Returns true only for the caller that created the entry.
    async fn claim(
        &self,
        trigger_key: &str,
        organization_id: &str,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Drop a claim whose job could not be submitted.
    async fn release(&self, trigger_key: &str) -> Result<()>;

    /// Store the analytics work id on a claimed entry.
    async fn attach_job(&self, trigger_key: &str, job_id: &str) -> Result<()>;
}
