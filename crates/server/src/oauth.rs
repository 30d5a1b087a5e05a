//! Facebook OAuth routes.

use axum::{
    Json,
    extract::{Query, State},
};
use fbgate_types::{FacebookAccount, FbError};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Handles `GET /oauth/login`.
pub async fn login_url(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "oauth_url": state.oauth.login_url() }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Handles `GET /oauth/callback`: runs the exchange chain and stores the
/// resulting account under its Facebook user id.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<FacebookAccount>, ApiError> {
    let Some(code) = params.code else {
        let reason = params
            .error_description
            .or(params.error)
            .unwrap_or_else(|| "missing code".into());
        return Err(FbError::Validation(reason).into());
    };
    let account = state.oauth.finalize_oauth(&code).await?;
    state.accounts.save(&account).await?;
    Ok(Json(account))
}
