use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use storepulse_core::sync::{SyncSession, SyncTrigger, SyncTriggerOutcome};

use crate::{error::ApiResult, main_lib::AppState};

async fn trigger_sync(
    State(state): State<Arc<AppState>>,
    Json(trigger): Json<SyncTrigger>,
) -> ApiResult<Json<SyncTriggerOutcome>> {
    let outcome = state.sync_orchestrator.trigger_sync(trigger).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct SessionsQuery {
    limit: Option<i64>,
}

async fn get_sync_sessions(
    Path(org_id): Path<String>,
    Query(q): Query<SessionsQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SyncSession>>> {
    let limit = q.limit.unwrap_or(20).clamp(1, 200);
    let sessions = state
        .sync_sessions
        .get_recent_for_organization(&org_id, limit)?;
    Ok(Json(sessions))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(trigger_sync))
        .route("/organizations/{org_id}/sync-sessions", get(get_sync_sessions))
}
