//! Bounded pruning of expired event records.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use super::events_traits::EventRepositoryTrait;
use crate::constants::{CLEANUP_BATCH_SIZE, EVENT_RETENTION_DAYS};
use crate::errors::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub batch_size: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::days(EVENT_RETENTION_DAYS),
            batch_size: CLEANUP_BATCH_SIZE,
        }
    }
}

/// Result of one sweep. `exhausted` is true once fewer than `batch_size`
/// expired records remained, so callers can stop looping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub deleted: usize,
    pub cutoff: DateTime<Utc>,
    pub exhausted: bool,
}

pub struct EventRetentionService {
    repository: Arc<dyn EventRepositoryTrait>,
    policy: RetentionPolicy,
}

impl EventRetentionService {
    pub fn new(repository: Arc<dyn EventRepositoryTrait>, policy: RetentionPolicy) -> Result<Self> {
        if policy.batch_size <= 0 {
            return Err(ValidationError::InvalidInput(format!(
                "cleanup batch size must be positive, got {}",
                policy.batch_size
            ))
            .into());
        }
        if policy.max_age <= Duration::zero() {
            return Err(ValidationError::InvalidInput(
                "retention window must be positive".to_string(),
            )
            .into());
        }
        Ok(Self { repository, policy })
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Delete one batch of records older than the retention window.
    pub async fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let cutoff = now - self.policy.max_age;
        let deleted = self
            .repository
            .delete_created_before(cutoff, self.policy.batch_size)
            .await?;
        let exhausted = (deleted as i64) < self.policy.batch_size;
        if deleted > 0 {
            info!("Event cleanup removed {} records older than {}", deleted, cutoff);
        }
        Ok(SweepReport {
            deleted,
            cutoff,
            exhausted,
        })
    }
}
