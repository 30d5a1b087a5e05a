//! Bearer-token gate for protected routes.

use crate::{ApiError, AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use fbgate_types::{CredentialRecord, FbError};
use std::sync::Arc;

/// The account behind a request's `Authorization: Bearer …` header.
///
/// Rejects with 401 "Invalid token" when the header is missing or the token
/// does not verify, and 401 "Invalid credentials" when it names no known
/// account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub CredentialRecord);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError(FbError::InvalidSignatureOrExpiry))?;
        let record = state.credentials.authenticate(token).await?;
        Ok(Self(record))
    }
}

/// Token part of a `Bearer` authorization value; the scheme is
/// case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
