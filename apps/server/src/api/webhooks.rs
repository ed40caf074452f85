use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use storepulse_core::webhooks::{ReceiptOutcome, WebhookReceipt, WebhookStatus};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

pub const WEBHOOK_ID_HEADER: &str = "x-webhook-id";
pub const WEBHOOK_TOPIC_HEADER: &str = "x-webhook-topic";
pub const SHOP_DOMAIN_HEADER: &str = "x-shop-domain";

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> ApiResult<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing header {}", name)))
}

/// Records the delivery. Signature verification happens upstream.
async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ReceiptOutcome>> {
    let webhook_id = required_header(&headers, WEBHOOK_ID_HEADER)?;
    let topic = required_header(&headers, WEBHOOK_TOPIC_HEADER)?;
    let shop_domain = required_header(&headers, SHOP_DOMAIN_HEADER)?;
    let outcome = state
        .webhook_service
        .record_receipt(webhook_id, topic, shop_domain)
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: WebhookStatus,
}

async fn update_receipt_status(
    Path(receipt_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<WebhookReceipt>> {
    let receipt = state
        .webhook_service
        .mark_status(&receipt_id, body.status)
        .await?;
    Ok(Json(receipt))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhooks", post(receive_webhook))
        .route("/webhooks/{receipt_id}/status", put(update_receipt_status))
}
