use std::sync::Arc;

use chrono::Utc;
use log::debug;

use super::sync_session_model::{SyncSession, SyncSessionRepositoryTrait, SyncStatus};
use crate::errors::{DatabaseError, Result};

/// Status updates issued by the job executing a sync session.
pub struct SyncSessionTracker {
    sessions: Arc<dyn SyncSessionRepositoryTrait>,
}

impl SyncSessionTracker {
    pub fn new(sessions: Arc<dyn SyncSessionRepositoryTrait>) -> Self {
        Self { sessions }
    }

    pub fn get(&self, session_id: &str) -> Result<SyncSession> {
        self.sessions
            .get_by_id(session_id)?
            .ok_or_else(|| DatabaseError::NotFound(format!("sync session {}", session_id)).into())
    }

    pub async fn advance(&self, session_id: &str, status: SyncStatus) -> Result<SyncSession> {
        let mut session = self.get(session_id)?;
        let now = Utc::now();
        match status {
            SyncStatus::Pending => return Ok(session),
            SyncStatus::Processing => session.start_processing(now)?,
            SyncStatus::Syncing => session.start_syncing(now)?,
            SyncStatus::Completed => session.complete(now)?,
            SyncStatus::Failed => session.fail("failed".to_string(), now)?,
        }
        debug!("Sync session {} is now {}", session_id, status.as_str());
        self.sessions.update(session).await
    }

    pub async fn fail(&self, session_id: &str, error: impl Into<String>) -> Result<SyncSession> {
        let mut session = self.get(session_id)?;
        session.fail(error.into(), Utc::now())?;
        self.sessions.update(session).await
    }
}
