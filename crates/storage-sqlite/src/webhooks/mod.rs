//! SQLite storage implementation for webhook receipts.

mod model;
mod repository;

pub use model::{NewWebhookReceiptDB, WebhookReceiptDB};
pub use repository::WebhookReceiptRepository;
