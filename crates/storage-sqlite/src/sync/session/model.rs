//! Database model for sync sessions.

use diesel::prelude::*;
use log::warn;

use storepulse_core::platforms::Platform;
use storepulse_core::sync::{DateRange, SyncSession, SyncStatus, SyncType};

use crate::errors::StorageError;
use crate::utils::{format_date, format_timestamp, parse_date, parse_optional_timestamp, parse_timestamp};

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::sync_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
// None leaves the column as stored, so a status update issued by the running
// job never clears a job id attached concurrently.
pub struct SyncSessionDB {
    pub id: String,
    pub organization_id: String,
    pub platform: String,
    pub account_id: Option<String>,
    pub sync_type: String,
    pub status: String,
    pub job_id: Option<String>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub error: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub updated_at: String,
}

impl TryFrom<SyncSessionDB> for SyncSession {
    type Error = StorageError;

    fn try_from(db: SyncSessionDB) -> Result<Self, Self::Error> {
        let platform: Platform = db
            .platform
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("sync session {}: {}", db.id, e)))?;
        let sync_type: SyncType = db
            .sync_type
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("sync session {}: {}", db.id, e)))?;
        let status: SyncStatus = db
            .status
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("sync session {}: {}", db.id, e)))?;

        let date_range = match (db.range_start.as_deref(), db.range_end.as_deref()) {
            (Some(start), Some(end)) => match (parse_date(start), parse_date(end)) {
                (Some(start), Some(end)) => Some(DateRange { start, end }),
                _ => {
                    warn!("Ignoring unreadable date range on sync session {}", db.id);
                    None
                }
            },
            _ => None,
        };

        Ok(SyncSession {
            id: db.id,
            organization_id: db.organization_id,
            platform,
            account_id: db.account_id,
            sync_type,
            status,
            job_id: db.job_id,
            date_range,
            error: db.error,
            started_at: parse_timestamp(&db.started_at),
            completed_at: parse_optional_timestamp(db.completed_at),
            updated_at: parse_timestamp(&db.updated_at),
        })
    }
}

impl From<&SyncSession> for SyncSessionDB {
    fn from(domain: &SyncSession) -> Self {
        Self {
            id: domain.id.clone(),
            organization_id: domain.organization_id.clone(),
            platform: domain.platform.as_str().to_string(),
            account_id: domain.account_id.clone(),
            sync_type: domain.sync_type.as_str().to_string(),
            status: domain.status.as_str().to_string(),
            job_id: domain.job_id.clone(),
            range_start: domain.date_range.map(|r| format_date(r.start)),
            range_end: domain.date_range.map(|r| format_date(r.end)),
            error: domain.error.clone(),
            started_at: format_timestamp(domain.started_at),
            completed_at: domain.completed_at.map(format_timestamp),
            updated_at: format_timestamp(domain.updated_at),
        }
    }
}
