//! Inbound webhook receipt deduplication.

mod webhooks_model;
mod webhooks_service;
mod webhooks_traits;

pub use webhooks_model::*;
pub use webhooks_service::WebhookReceiptService;
pub use webhooks_traits::*;
