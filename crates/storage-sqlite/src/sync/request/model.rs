//! Database models for the sync request log.

use diesel::prelude::*;

use storepulse_core::sync::SyncRequest;

use crate::errors::StorageError;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::sync_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncRequestDB {
    pub id: i64,
    pub organization_id: String,
    pub platform: String,
    pub job_id: String,
    pub session_id: Option<String>,
    pub requested_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::sync_requests)]
pub struct NewSyncRequestDB {
    pub organization_id: String,
    pub platform: String,
    pub job_id: String,
    pub session_id: Option<String>,
    pub requested_at: String,
}

impl TryFrom<SyncRequestDB> for SyncRequest {
    type Error = StorageError;

    fn try_from(db: SyncRequestDB) -> Result<Self, Self::Error> {
        Ok(SyncRequest {
            platform: db
                .platform
                .parse()
                .map_err(|e| StorageError::Corrupt(format!("sync request {}: {}", db.id, e)))?,
            organization_id: db.organization_id,
            job_id: db.job_id,
            session_id: db.session_id,
            requested_at: parse_timestamp(&db.requested_at),
        })
    }
}

impl From<&SyncRequest> for NewSyncRequestDB {
    fn from(domain: &SyncRequest) -> Self {
        Self {
            organization_id: domain.organization_id.clone(),
            platform: domain.platform.as_str().to_string(),
            job_id: domain.job_id.clone(),
            session_id: domain.session_id.clone(),
            requested_at: format_timestamp(domain.requested_at),
        }
    }
}
