//! Insert-if-absent ledger of triggered analytics runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use storepulse_core::errors::Result;
use storepulse_core::sync::AnalyticsTriggerLedgerTrait;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::analytics_triggers;
use crate::utils::format_timestamp;

use super::model::AnalyticsTriggerDB;

pub struct AnalyticsTriggerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AnalyticsTriggerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub fn get(&self, trigger_key: &str) -> Result<Option<AnalyticsTriggerDB>> {
        let mut conn = get_connection(&self.pool)?;
        let row = analytics_triggers::table
            .find(trigger_key)
            .select(AnalyticsTriggerDB::as_select())
            .first::<AnalyticsTriggerDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row)
    }
}

#[async_trait]
impl AnalyticsTriggerLedgerTrait for AnalyticsTriggerRepository {
    async fn claim(
        &self,
        trigger_key: &str,
        organization_id: &str,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let row = AnalyticsTriggerDB {
            trigger_key: trigger_key.to_string(),
            organization_id: organization_id.to_string(),
            job_id: None,
            claimed_at: format_timestamp(claimed_at),
        };
        self.writer
            .exec(move |conn| {
                let inserted = diesel::insert_or_ignore_into(analytics_triggers::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted == 1)
            })
            .await
    }

    async fn release(&self, trigger_key: &str) -> Result<()> {
        let key = trigger_key.to_string();
        self.writer
            .exec(move |conn| {
                diesel::delete(analytics_triggers::table.find(key))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn attach_job(&self, trigger_key: &str, job_id: &str) -> Result<()> {
        let key = trigger_key.to_string();
        let job_id = job_id.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(analytics_triggers::table.find(key))
                    .set(analytics_triggers::job_id.eq(Some(job_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_only_first_claim_wins_until_released() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let ledger = AnalyticsTriggerRepository::new(pool.clone(), spawn_writer((*pool).clone()));
        let key = "initial-sync:org-1:meta,shopify";

        let (a, b) = tokio::join!(
            ledger.claim(key, "org-1", Utc::now()),
            ledger.claim(key, "org-1", Utc::now())
        );
        assert_ne!(a.unwrap(), b.unwrap());

        ledger.attach_job(key, "job-42").await.unwrap();
        assert_eq!(
            ledger.get(key).unwrap().unwrap().job_id.as_deref(),
            Some("job-42")
        );

        ledger.release(key).await.unwrap();
        assert!(ledger.get(key).unwrap().is_none());
        assert!(ledger.claim(key, "org-1", Utc::now()).await.unwrap());
    }
}
