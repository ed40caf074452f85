//! Sync session domain models.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, ValidationError};
use crate::platforms::Platform;

/// Kind of import a session performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    /// First historical import after a platform is connected
    Initial,
    /// Regular catch-up import
    Incremental,
    /// Caller-requested re-import of a date range
    Backfill,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::Initial => "initial",
            SyncType::Incremental => "incremental",
            SyncType::Backfill => "backfill",
        }
    }
}

impl FromStr for SyncType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "initial" => Ok(SyncType::Initial),
            "incremental" => Ok(SyncType::Incremental),
            "backfill" => Ok(SyncType::Backfill),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown sync type '{}'",
                other
            ))),
        }
    }
}

/// Status of a sync session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Created, job not yet picked up
    #[default]
    Pending,
    /// Job started, preparing the import
    Processing,
    /// Fetching data from the platform
    Syncing,
    Completed,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Processing => "processing",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Completed => "completed",
            SyncStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStatus::Completed | SyncStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            SyncStatus::Pending => 0,
            SyncStatus::Processing => 1,
            SyncStatus::Syncing => 2,
            SyncStatus::Completed | SyncStatus::Failed => 3,
        }
    }

    /// Sessions only move forward and never leave a terminal state.
    pub fn can_transition_to(&self, next: SyncStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl FromStr for SyncStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SyncStatus::Pending),
            "processing" => Ok(SyncStatus::Processing),
            "syncing" => Ok(SyncStatus::Syncing),
            "completed" => Ok(SyncStatus::Completed),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown sync status '{}'",
                other
            ))),
        }
    }
}

/// Inclusive date range for a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ValidationError::InvalidInput(format!(
                "Date range start {} is after end {}",
                start, end
            ))
            .into());
        }
        Ok(Self { start, end })
    }
}

/// One execution attempt importing data from a platform for an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSession {
    pub id: String,
    pub organization_id: String,
    pub platform: Platform,
    /// Platform account being synced, when the caller scoped the sync to one
    pub account_id: Option<String>,
    pub sync_type: SyncType,
    pub status: SyncStatus,
    /// Work id assigned by the job engine
    pub job_id: Option<String>,
    pub date_range: Option<DateRange>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SyncSession {
    /// Create a pending session
    pub fn pending(
        organization_id: String,
        platform: Platform,
        account_id: Option<String>,
        sync_type: SyncType,
        date_range: Option<DateRange>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            organization_id,
            platform,
            account_id,
            sync_type,
            status: SyncStatus::Pending,
            job_id: None,
            date_range,
            error: None,
            started_at: now,
            completed_at: None,
            updated_at: now,
        }
    }

    fn transition(&mut self, next: SyncStatus, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ValidationError::InvalidInput(format!(
                "Sync session {} cannot move from {} to {}",
                self.id,
                self.status.as_str(),
                next.as_str()
            ))
            .into());
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn start_processing(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(SyncStatus::Processing, now)
    }

    pub fn start_syncing(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(SyncStatus::Syncing, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(SyncStatus::Completed, now)?;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn fail(&mut self, error: String, now: DateTime<Utc>) -> Result<()> {
        self.transition(SyncStatus::Failed, now)?;
        self.error = Some(error);
        self.completed_at = Some(now);
        Ok(())
    }
}

/// Trait for sync session persistence operations
#[async_trait]
pub trait SyncSessionRepositoryTrait: Send + Sync {
    async fn create(&self, session: SyncSession) -> Result<SyncSession>;

    async fn update(&self, session: SyncSession) -> Result<SyncSession>;

    /// Records the engine work id without touching the status columns, which
    /// the running job may already have moved.
    async fn set_job_id(&self, session_id: &str, job_id: &str) -> Result<()>;

    fn get_by_id(&self, id: &str) -> Result<Option<SyncSession>>;

    /// Whether an `initial` session with status `completed` exists (index-backed).
    fn has_completed_initial_sync(&self, organization_id: &str, platform: Platform)
        -> Result<bool>;

    /// Latest session for the account whose status is not `failed`.
    fn latest_non_failed_for_account(
        &self,
        organization_id: &str,
        platform: Platform,
        account_id: &str,
    ) -> Result<Option<SyncSession>>;

    /// Most recent first.
    fn get_recent_for_organization(
        &self,
        organization_id: &str,
        limit: i64,
    ) -> Result<Vec<SyncSession>>;
}
