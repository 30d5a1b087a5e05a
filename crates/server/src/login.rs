//! `POST /login`: exchange e-mail and password for a session token.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use bytes::Bytes;
use fbgate_auth::session::TOKEN_TYPE;
use fbgate_types::FbError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Login body. `username` carries the account e-mail.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Accepts `application/x-www-form-urlencoded` (the OAuth2 password-form
/// shape) or JSON.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let req = parse_login(&headers, &body)?;
    let access_token = state
        .credentials
        .login(&req.username, &req.password)
        .await?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

fn parse_login(headers: &HeaderMap, body: &[u8]) -> Result<LoginRequest, FbError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        serde_json::from_slice(body)
            .map_err(|e| FbError::Validation(format!("invalid login body: {e}")))
    } else {
        serde_urlencoded::from_bytes(body)
            .map_err(|e| FbError::Validation(format!("invalid login form: {e}")))
    }
}
