use diesel::prelude::*;

use storepulse_core::webhooks::{NewWebhookReceipt, WebhookReceipt};

use crate::errors::StorageError;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::webhook_receipts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WebhookReceiptDB {
    pub creation_order: i64,
    pub id: String,
    pub provider_webhook_id: String,
    pub topic: String,
    pub shop_domain: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert shape; `creation_order` is assigned by SQLite.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::webhook_receipts)]
pub struct NewWebhookReceiptDB {
    pub id: String,
    pub provider_webhook_id: String,
    pub topic: String,
    pub shop_domain: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NewWebhookReceipt> for NewWebhookReceiptDB {
    fn from(receipt: NewWebhookReceipt) -> Self {
        let created_at = format_timestamp(receipt.created_at);
        Self {
            id: receipt.id,
            provider_webhook_id: receipt.provider_webhook_id,
            topic: receipt.topic,
            shop_domain: receipt.shop_domain,
            status: "received".to_string(),
            updated_at: created_at.clone(),
            created_at,
        }
    }
}

impl TryFrom<WebhookReceiptDB> for WebhookReceipt {
    type Error = StorageError;

    fn try_from(db: WebhookReceiptDB) -> Result<Self, Self::Error> {
        Ok(WebhookReceipt {
            status: db
                .status
                .parse()
                .map_err(|e| StorageError::Corrupt(format!("receipt {}: {}", db.id, e)))?,
            id: db.id,
            provider_webhook_id: db.provider_webhook_id,
            topic: db.topic,
            shop_domain: db.shop_domain,
            creation_order: db.creation_order,
            created_at: parse_timestamp(&db.created_at),
            updated_at: parse_timestamp(&db.updated_at),
        })
    }
}
