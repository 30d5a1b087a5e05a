//! Ad account, campaign, ad set and ad routes.

use axum::{
    Json,
    extract::{Query, State},
};
use fbgate_graph::{AdInput, AdSetInput, CampaignInput, VideoAdInput};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{ApiError, AppState};

#[derive(Deserialize)]
pub struct TokenQuery {
    pub access_token: String,
}

#[derive(Deserialize)]
pub struct CampaignQuery {
    pub campaign_id: String,
    pub access_token: String,
}

/// Handles `GET /ad_accounts`.
pub async fn list_ad_accounts(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.graph.list_ad_accounts(&q.access_token).await?))
}

/// Handles `GET /facebook/ad_accounts`.
pub async fn raw_ad_accounts(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.graph.raw_ad_accounts(&q.access_token).await?))
}

/// Handles `POST /facebook/campaigns/create`; parameters come in the query.
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Query(input): Query<CampaignInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.graph.create_campaign(&input).await?))
}

/// Handles `GET /facebook/campaigns/get`.
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CampaignQuery>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        state
            .graph
            .get_campaign(&q.campaign_id, &q.access_token)
            .await?,
    ))
}

pub async fn create_adset(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AdSetInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.graph.create_adset(&input).await?))
}

pub async fn create_ad(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AdInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.graph.create_ad(&input).await?))
}

pub async fn create_video_ad(
    State(state): State<Arc<AppState>>,
    Json(input): Json<VideoAdInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.graph.create_video_ad(&input).await?))
}
