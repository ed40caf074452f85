use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::webhooks_model::{NewWebhookReceipt, WebhookReceipt, WebhookStatus};
use crate::errors::Result;

/// Trait for webhook receipt persistence
#[async_trait]
pub trait WebhookReceiptRepositoryTrait: Send + Sync {
    async fn insert(&self, receipt: NewWebhookReceipt) -> Result<WebhookReceipt>;

    fn list_by_provider_id(&self, provider_webhook_id: &str) -> Result<Vec<WebhookReceipt>>;

    /// Missing ids are ignored.
    async fn delete_by_ids(&self, ids: Vec<String>) -> Result<usize>;

    async fn update_status(
        &self,
        id: &str,
        status: WebhookStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<WebhookReceipt>;
}
