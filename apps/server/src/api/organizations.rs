use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storepulse_core::organizations::{
    NewOrganization, NewOrganizationCost, Organization, OrganizationCost,
};
use storepulse_core::platforms::{NewPlatformConnection, Platform, PlatformConnection};

use crate::{
    api::actor_from,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn upsert_organization(
    State(state): State<Arc<AppState>>,
    Json(organization): Json<NewOrganization>,
) -> ApiResult<Json<Organization>> {
    let saved = state
        .organization_service
        .upsert_organization(organization)
        .await?;
    Ok(Json(saved))
}

async fn get_organization(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Organization>> {
    state
        .organization_service
        .get_organization(&org_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Organization {} not found", org_id)))
}

async fn complete_onboarding(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Organization>> {
    let organization = state
        .organization_service
        .complete_onboarding(&org_id, actor_from(&headers))
        .await?;
    Ok(Json(organization))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewCostBody {
    label: String,
    amount: Decimal,
    currency: String,
    effective_from: NaiveDate,
}

async fn add_cost(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewCostBody>,
) -> ApiResult<(StatusCode, Json<OrganizationCost>)> {
    let cost = state
        .organization_service
        .add_cost(NewOrganizationCost {
            organization_id: org_id,
            label: body.label,
            amount: body.amount,
            currency: body.currency,
            effective_from: body.effective_from,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(cost)))
}

async fn list_connections(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PlatformConnection>>> {
    let connections = state.connection_service.list_connections(&org_id)?;
    Ok(Json(connections))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectBody {
    platform: Platform,
    account_id: String,
}

async fn connect_platform(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ConnectBody>,
) -> ApiResult<Json<PlatformConnection>> {
    let connection = state
        .connection_service
        .connect(
            NewPlatformConnection {
                organization_id: org_id,
                platform: body.platform,
                account_id: body.account_id,
            },
            actor_from(&headers),
        )
        .await?;
    Ok(Json(connection))
}

#[derive(Debug, Deserialize)]
struct DisconnectQuery {
    reason: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DisconnectResult {
    disconnected: bool,
}

async fn disconnect_platform(
    Path((org_id, platform)): Path<(String, String)>,
    Query(q): Query<DisconnectQuery>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<DisconnectResult>> {
    let platform: Platform = platform
        .parse()
        .map_err(|e: storepulse_core::errors::ValidationError| ApiError::BadRequest(e.to_string()))?;
    let disconnected = state
        .connection_service
        .disconnect(&org_id, platform, q.reason, actor_from(&headers))
        .await?;
    Ok(Json(DisconnectResult { disconnected }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/organizations", post(upsert_organization))
        .route("/organizations/{org_id}", get(get_organization))
        .route(
            "/organizations/{org_id}/onboarding/complete",
            post(complete_onboarding),
        )
        .route("/organizations/{org_id}/costs", post(add_cost))
        .route(
            "/organizations/{org_id}/connections",
            get(list_connections).post(connect_platform),
        )
        .route(
            "/organizations/{org_id}/connections/{platform}",
            delete(disconnect_platform),
        )
}
