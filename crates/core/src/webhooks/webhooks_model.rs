use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    #[default]
    Received,
    Processed,
    Failed,
}

impl WebhookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookStatus::Received => "received",
            WebhookStatus::Processed => "processed",
            WebhookStatus::Failed => "failed",
        }
    }
}

impl FromStr for WebhookStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(WebhookStatus::Received),
            "processed" => Ok(WebhookStatus::Processed),
            "failed" => Ok(WebhookStatus::Failed),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown webhook status '{}'",
                other
            ))),
        }
    }
}

/// One recorded delivery of a provider webhook.
///
/// `creation_order` is assigned by storage at insert and grows with insert
/// order, so it is the creation-time key used to pick a surviving receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReceipt {
    pub id: String,
    pub provider_webhook_id: String,
    pub topic: String,
    pub shop_domain: String,
    pub status: WebhookStatus,
    pub creation_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhookReceipt {
    pub id: String,
    pub provider_webhook_id: String,
    pub topic: String,
    pub shop_domain: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptOutcome {
    pub receipt_id: String,
    /// True when another receipt with the same provider id won.
    pub duplicate: bool,
}

/// Earliest creation wins; on an exact tie the smaller id wins.
pub fn select_surviving_receipt(receipts: &[WebhookReceipt]) -> Option<&WebhookReceipt> {
    receipts.iter().min_by(|a, b| {
        a.creation_order
            .cmp(&b.creation_order)
            .then_with(|| a.id.cmp(&b.id))
    })
}
