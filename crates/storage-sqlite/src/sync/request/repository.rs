//! Repository for the sync request log used by the request window.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use storepulse_core::errors::Result;
use storepulse_core::platforms::Platform;
use storepulse_core::sync::{SyncRequest, SyncRequestRepositoryTrait};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_requests;
use crate::utils::format_timestamp;

use super::model::{NewSyncRequestDB, SyncRequestDB};

pub struct SyncRequestRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncRequestRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncRequestRepositoryTrait for SyncRequestRepository {
    async fn record(&self, request: SyncRequest) -> Result<SyncRequest> {
        let row = NewSyncRequestDB::from(&request);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(sync_requests::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(request)
            })
            .await
    }

    fn find_latest_since(
        &self,
        organization_id: &str,
        platform: Platform,
        since: DateTime<Utc>,
    ) -> Result<Option<SyncRequest>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_requests::table
            .filter(sync_requests::organization_id.eq(organization_id))
            .filter(sync_requests::platform.eq(platform.as_str()))
            .filter(sync_requests::requested_at.ge(format_timestamp(since)))
            .order((sync_requests::requested_at.desc(), sync_requests::id.desc()))
            .select(SyncRequestDB::as_select())
            .first::<SyncRequestDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        match row {
            Some(row) => Ok(Some(SyncRequest::try_from(row)?)),
            None => Ok(None),
        }
    }
}
