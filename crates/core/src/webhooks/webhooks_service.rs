use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use super::webhooks_model::{
    select_surviving_receipt, NewWebhookReceipt, ReceiptOutcome, WebhookReceipt, WebhookStatus,
};
use super::webhooks_traits::WebhookReceiptRepositoryTrait;
use crate::errors::{require_non_empty, Result};

pub struct WebhookReceiptService {
    repository: Arc<dyn WebhookReceiptRepositoryTrait>,
}

impl WebhookReceiptService {
    pub fn new(repository: Arc<dyn WebhookReceiptRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Record a delivery, then reconcile it against other receipts with the
    /// same provider id.
    ///
    /// Insert happens before the read so concurrent deliveries always see
    /// each other. Every loser is deleted, including our own receipt when it
    /// lost or was already removed by a concurrent reconcile.
    pub async fn record_receipt(
        &self,
        provider_webhook_id: &str,
        topic: &str,
        shop_domain: &str,
    ) -> Result<ReceiptOutcome> {
        require_non_empty("providerWebhookId", provider_webhook_id)?;
        require_non_empty("topic", topic)?;
        require_non_empty("shopDomain", shop_domain)?;

        let own = self
            .repository
            .insert(NewWebhookReceipt {
                id: Uuid::new_v4().to_string(),
                provider_webhook_id: provider_webhook_id.to_string(),
                topic: topic.to_string(),
                shop_domain: shop_domain.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        let receipts = self.repository.list_by_provider_id(provider_webhook_id)?;
        let Some(winner) = select_surviving_receipt(&receipts) else {
            debug!(
                "Receipt {} for webhook {} already reconciled away",
                own.id, provider_webhook_id
            );
            return Ok(ReceiptOutcome {
                receipt_id: own.id,
                duplicate: true,
            });
        };

        let losers: Vec<String> = receipts
            .iter()
            .filter(|r| r.id != winner.id)
            .map(|r| r.id.clone())
            .collect();
        if !losers.is_empty() {
            let removed = self.repository.delete_by_ids(losers).await?;
            debug!(
                "Removed {} duplicate receipt(s) for webhook {}",
                removed, provider_webhook_id
            );
        }

        let duplicate = winner.id != own.id;
        if duplicate {
            info!(
                "Duplicate delivery of webhook {} ({}, {})",
                provider_webhook_id, topic, shop_domain
            );
        }
        Ok(ReceiptOutcome {
            receipt_id: own.id,
            duplicate,
        })
    }

    pub async fn mark_status(&self, receipt_id: &str, status: WebhookStatus) -> Result<WebhookReceipt> {
        require_non_empty("receiptId", receipt_id)?;
        self.repository
            .update_status(receipt_id, status, Utc::now())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryReceipts {
        rows: Mutex<Vec<WebhookReceipt>>,
        next_order: Mutex<i64>,
    }

    #[async_trait]
    impl WebhookReceiptRepositoryTrait for MemoryReceipts {
        async fn insert(&self, receipt: NewWebhookReceipt) -> Result<WebhookReceipt> {
            let mut order = self.next_order.lock().unwrap();
            *order += 1;
            let row = WebhookReceipt {
                id: receipt.id,
                provider_webhook_id: receipt.provider_webhook_id,
                topic: receipt.topic,
                shop_domain: receipt.shop_domain,
                status: WebhookStatus::Received,
                creation_order: *order,
                created_at: receipt.created_at,
                updated_at: receipt.created_at,
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        fn list_by_provider_id(&self, provider_webhook_id: &str) -> Result<Vec<WebhookReceipt>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.provider_webhook_id == provider_webhook_id)
                .cloned()
                .collect())
        }

        async fn delete_by_ids(&self, ids: Vec<String>) -> Result<usize> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !ids.contains(&r.id));
            Ok(before - rows.len())
        }

        async fn update_status(
            &self,
            id: &str,
            status: WebhookStatus,
            updated_at: DateTime<Utc>,
        ) -> Result<WebhookReceipt> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| crate::errors::DatabaseError::NotFound(id.to_string()))?;
            row.status = status;
            row.updated_at = updated_at;
            Ok(row.clone())
        }
    }

    fn receipt(id: &str, order: i64) -> WebhookReceipt {
        WebhookReceipt {
            id: id.to_string(),
            provider_webhook_id: "wh-1".to_string(),
            topic: "orders/create".to_string(),
            shop_domain: "shop.example.com".to_string(),
            status: WebhookStatus::Received,
            creation_order: order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_earliest_receipt_survives() {
        let receipts = vec![receipt("b", 2), receipt("c", 1), receipt("a", 3)];
        assert_eq!(select_surviving_receipt(&receipts).unwrap().id, "c");
    }

    #[test]
    fn test_tie_broken_by_smaller_id() {
        let receipts = vec![receipt("b", 1), receipt("a", 1)];
        assert_eq!(select_surviving_receipt(&receipts).unwrap().id, "a");
        assert!(select_surviving_receipt(&[]).is_none());
    }

    #[tokio::test]
    async fn test_second_delivery_is_duplicate_and_removed() {
        let repo = Arc::new(MemoryReceipts::default());
        let service = WebhookReceiptService::new(repo.clone());

        let first = service
            .record_receipt("wh-1", "orders/create", "shop.example.com")
            .await
            .unwrap();
        let second = service
            .record_receipt("wh-1", "orders/create", "shop.example.com")
            .await
            .unwrap();
        let other = service
            .record_receipt("wh-2", "orders/create", "shop.example.com")
            .await
            .unwrap();

        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert!(!other.duplicate);

        let survivors = repo.list_by_provider_id("wh-1").unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, first.receipt_id);
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_have_one_winner() {
        let repo = Arc::new(MemoryReceipts::default());
        let service = Arc::new(WebhookReceiptService::new(repo.clone()));

        let deliveries = (0..8).map(|_| {
            let service = service.clone();
            async move {
                service
                    .record_receipt("wh-9", "orders/paid", "shop.example.com")
                    .await
                    .unwrap()
            }
        });
        let outcomes = futures::future::join_all(deliveries).await;
        let winners = outcomes.iter().filter(|o| !o.duplicate).count();

        assert_eq!(winners, 1);
        assert_eq!(repo.list_by_provider_id("wh-9").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_status() {
        let repo = Arc::new(MemoryReceipts::default());
        let service = WebhookReceiptService::new(repo);
        let outcome = service
            .record_receipt("wh-1", "orders/create", "shop.example.com")
            .await
            .unwrap();

        let updated = service
            .mark_status(&outcome.receipt_id, WebhookStatus::Processed)
            .await
            .unwrap();
        assert_eq!(updated.status, WebhookStatus::Processed);
        assert!(service.mark_status("missing", WebhookStatus::Failed).await.is_err());
    }

    #[tokio::test]
    async fn test_blank_provider_id_rejected() {
        let repo = Arc::new(MemoryReceipts::default());
        let service = WebhookReceiptService::new(repo.clone());
        assert!(service.record_receipt("", "t", "d").await.is_err());
        assert!(repo.rows.lock().unwrap().is_empty());
    }
}
