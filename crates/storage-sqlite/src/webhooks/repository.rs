//! Repository for webhook receipts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use storepulse_core::errors::{DatabaseError, Result};
use storepulse_core::webhooks::{
    NewWebhookReceipt, WebhookReceipt, WebhookReceiptRepositoryTrait, WebhookStatus,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::webhook_receipts;
use crate::utils::{chunk_for_sqlite, format_timestamp};

use super::model::{NewWebhookReceiptDB, WebhookReceiptDB};

pub struct WebhookReceiptRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WebhookReceiptRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl WebhookReceiptRepositoryTrait for WebhookReceiptRepository {
    async fn insert(&self, receipt: NewWebhookReceipt) -> Result<WebhookReceipt> {
        let row = NewWebhookReceiptDB::from(receipt);
        self.writer
            .exec(move |conn| {
                let stored = diesel::insert_into(webhook_receipts::table)
                    .values(&row)
                    .returning(WebhookReceiptDB::as_returning())
                    .get_result::<WebhookReceiptDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(WebhookReceipt::try_from(stored)?)
            })
            .await
    }

    fn list_by_provider_id(&self, provider_webhook_id: &str) -> Result<Vec<WebhookReceipt>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = webhook_receipts::table
            .filter(webhook_receipts::provider_webhook_id.eq(provider_webhook_id))
            .order(webhook_receipts::creation_order.asc())
            .select(WebhookReceiptDB::as_select())
            .load::<WebhookReceiptDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| WebhookReceipt::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn delete_by_ids(&self, ids: Vec<String>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn| {
                let mut deleted = 0;
                for chunk in chunk_for_sqlite(&ids) {
                    deleted += diesel::delete(
                        webhook_receipts::table.filter(webhook_receipts::id.eq_any(chunk)),
                    )
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(deleted)
            })
            .await
    }

    async fn update_status(
        &self,
        id: &str,
        status: WebhookStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<WebhookReceipt> {
        let id = id.to_string();
        let updated_at = format_timestamp(updated_at);
        self.writer
            .exec(move |conn| {
                let changed = diesel::update(
                    webhook_receipts::table.filter(webhook_receipts::id.eq(&id)),
                )
                .set((
                    webhook_receipts::status.eq(status.as_str()),
                    webhook_receipts::updated_at.eq(&updated_at),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                if changed == 0 {
                    return Err(
                        DatabaseError::NotFound(format!("Webhook receipt {}", id)).into()
                    );
                }
                let row = webhook_receipts::table
                    .filter(webhook_receipts::id.eq(&id))
                    .select(WebhookReceiptDB::as_select())
                    .first::<WebhookReceiptDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(WebhookReceipt::try_from(row)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use futures::future::join_all;
    use storepulse_core::errors::Error;
    use storepulse_core::webhooks::WebhookReceiptService;
    use tempfile::tempdir;

    async fn create_test_repository() -> (Arc<WebhookReceiptRepository>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (
            Arc::new(WebhookReceiptRepository::new(pool, writer)),
            temp_dir,
        )
    }

    fn new_receipt(id: &str, provider_id: &str) -> NewWebhookReceipt {
        NewWebhookReceipt {
            id: id.to_string(),
            provider_webhook_id: provider_id.to_string(),
            topic: "orders/create".to_string(),
            shop_domain: "shop.example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_creation_order_follows_insert_order() {
        let (repo, _dir) = create_test_repository().await;
        let first = repo.insert(new_receipt("zzz", "wh-1")).await.unwrap();
        let second = repo.insert(new_receipt("aaa", "wh-1")).await.unwrap();
        assert!(first.creation_order < second.creation_order);

        let listed = repo.list_by_provider_id("wh-1").unwrap();
        assert_eq!(
            listed.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["zzz", "aaa"]
        );
    }

    #[tokio::test]
    async fn test_update_status_and_missing_receipt() {
        let (repo, _dir) = create_test_repository().await;
        repo.insert(new_receipt("r-1", "wh-1")).await.unwrap();

        let updated = repo
            .update_status("r-1", WebhookStatus::Processed, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status, WebhookStatus::Processed);

        let missing = repo
            .update_status("r-404", WebhookStatus::Failed, Utc::now())
            .await;
        assert!(matches!(
            missing,
            Err(Error::Database(DatabaseError::NotFound(_)))
        ));
        assert_eq!(repo.delete_by_ids(vec![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_keep_one_receipt() {
        let (repo, _dir) = create_test_repository().await;
        let service = Arc::new(WebhookReceiptService::new(repo.clone()));

        let deliveries = (0..8).map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .record_receipt("wh-42", "orders/create", "shop.example.com")
                    .await
            })
        });
        let outcomes: Vec<_> = join_all(deliveries)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        let survivors = repo.list_by_provider_id("wh-42").unwrap();
        assert_eq!(survivors.len(), 1);
        let originals: Vec<_> = outcomes.iter().filter(|o| !o.duplicate).collect();
        assert_eq!(originals.len(), 1);
        assert_eq!(originals[0].receipt_id, survivors[0].id);
    }
}
