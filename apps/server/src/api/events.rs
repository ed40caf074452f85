use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use storepulse_core::events::{DomainEvent, EmitRequest, EmitResult, EventCategory, EventRecord};

use crate::{api::actor_from, error::ApiResult, main_lib::AppState};

/// Raw event as posted by clients. Unknown types are accepted and stored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitEventBody {
    #[serde(rename = "type")]
    pub event_type: String,
    pub organization_id: String,
    #[serde(default)]
    pub actor_user_id: Option<String>,
    #[serde(default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl EmitEventBody {
    fn into_request(self, header_actor: Option<String>) -> storepulse_core::Result<EmitRequest> {
        let event = DomainEvent::from_parts(&self.event_type, self.payload)?;
        Ok(EmitRequest {
            event,
            organization_id: self.organization_id,
            actor_user_id: self.actor_user_id.or(header_actor),
            category: self.category,
            occurred_at: self.occurred_at,
        })
    }
}

async fn emit_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<EmitEventBody>,
) -> ApiResult<Json<EmitResult>> {
    let request = body.into_request(actor_from(&headers))?;
    let result = state.event_service.emit(request).await?;
    Ok(Json(result))
}

async fn emit_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Vec<EmitEventBody>>,
) -> ApiResult<Json<Vec<EmitResult>>> {
    let actor = actor_from(&headers);
    let requests = body
        .into_iter()
        .map(|b| b.into_request(actor.clone()))
        .collect::<storepulse_core::Result<Vec<_>>>()?;
    let results = state.event_service.emit_batch(requests).await?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
struct RecentEventsQuery {
    limit: Option<i64>,
    #[serde(rename = "type")]
    event_type: Option<String>,
}

async fn get_recent_events(
    Path(org_id): Path<String>,
    Query(q): Query<RecentEventsQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<EventRecord>>> {
    let events = state
        .event_service
        .get_recent_events(&org_id, q.limit, q.event_type)?;
    Ok(Json(events))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", post(emit_event))
        .route("/events/batch", post(emit_batch))
        .route("/organizations/{org_id}/events", get(get_recent_events))
}
