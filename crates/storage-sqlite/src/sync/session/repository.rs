//! Repository for sync session persistence.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use std::sync::Arc;

use storepulse_core::errors::Result;
use storepulse_core::platforms::Platform;
use storepulse_core::sync::{SyncSession, SyncSessionRepositoryTrait, SyncStatus, SyncType};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_sessions;

use super::model::SyncSessionDB;

pub struct SyncSessionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncSessionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn to_domain(rows: Vec<SyncSessionDB>) -> Result<Vec<SyncSession>> {
    rows.into_iter()
        .map(|row| SyncSession::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl SyncSessionRepositoryTrait for SyncSessionRepository {
    async fn create(&self, session: SyncSession) -> Result<SyncSession> {
        let row = SyncSessionDB::from(&session);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(sync_sessions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(session)
            })
            .await
    }

    async fn update(&self, session: SyncSession) -> Result<SyncSession> {
        let row = SyncSessionDB::from(&session);
        self.writer
            .exec(move |conn| {
                diesel::update(sync_sessions::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(session)
            })
            .await
    }

    async fn set_job_id(&self, session_id: &str, job_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        let job_id = job_id.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(sync_sessions::table.find(&session_id))
                    .set(sync_sessions::job_id.eq(Some(job_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn get_by_id(&self, id: &str) -> Result<Option<SyncSession>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_sessions::table
            .find(id)
            .select(SyncSessionDB::as_select())
            .first::<SyncSessionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(to_domain(row.into_iter().collect())?.pop())
    }

    fn has_completed_initial_sync(
        &self,
        organization_id: &str,
        platform: Platform,
    ) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(exists(
            sync_sessions::table
                .filter(sync_sessions::organization_id.eq(organization_id))
                .filter(sync_sessions::platform.eq(platform.as_str()))
                .filter(sync_sessions::sync_type.eq(SyncType::Initial.as_str()))
                .filter(sync_sessions::status.eq(SyncStatus::Completed.as_str())),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(found)
    }

    fn latest_non_failed_for_account(
        &self,
        organization_id: &str,
        platform: Platform,
        account_id: &str,
    ) -> Result<Option<SyncSession>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_sessions::table
            .filter(sync_sessions::organization_id.eq(organization_id))
            .filter(sync_sessions::platform.eq(platform.as_str()))
            .filter(sync_sessions::account_id.eq(account_id))
            .filter(sync_sessions::status.ne(SyncStatus::Failed.as_str()))
            .order(sync_sessions::started_at.desc())
            .select(SyncSessionDB::as_select())
            .first::<SyncSessionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(to_domain(row.into_iter().collect())?.pop())
    }

    fn get_recent_for_organization(
        &self,
        organization_id: &str,
        limit: i64,
    ) -> Result<Vec<SyncSession>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sync_sessions::table
            .filter(sync_sessions::organization_id.eq(organization_id))
            .order(sync_sessions::started_at.desc())
            .limit(limit)
            .select(SyncSessionDB::as_select())
            .load::<SyncSessionDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }
}
