//! API error type that maps [`FbError`] variants to HTTP responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use fbgate_types::FbError;
use serde_json::json;

/// Wrapper around [`FbError`] that implements [`IntoResponse`].
#[derive(Debug)]
pub struct ApiError(pub FbError);

impl ApiError {
    /// Returns `(status, error_type, error_code)` for the wrapped error.
    fn classify(&self) -> (StatusCode, &'static str, &'static str) {
        match &self.0 {
            FbError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "invalid_credentials",
            ),
            FbError::InvalidSignatureOrExpiry => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_token",
            ),
            FbError::UnknownSubject => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "unknown_subject",
            ),
            FbError::TokenExchangeFailed(_) => (
                StatusCode::BAD_REQUEST,
                "oauth_error",
                "token_exchange_failed",
            ),
            FbError::Graph { .. } => (StatusCode::BAD_REQUEST, "facebook_error", "graph_error"),
            FbError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_error",
            ),
            FbError::Conflict(_) => (StatusCode::CONFLICT, "invalid_request_error", "conflict"),
            FbError::Http(_) => (StatusCode::BAD_GATEWAY, "server_error", "upstream_error"),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "internal_error",
            ),
        }
    }

    /// The client-facing message. Auth failures stay generic; upstream and
    /// internal errors are logged, not echoed.
    fn message(&self) -> String {
        match &self.0 {
            FbError::InvalidCredentials => "Invalid email or password".into(),
            FbError::InvalidSignatureOrExpiry => "Invalid token".into(),
            FbError::UnknownSubject => "Invalid credentials".into(),
            FbError::TokenExchangeFailed(raw) => format!("Token error: {raw}"),
            FbError::Validation(msg) | FbError::Conflict(msg) => msg.clone(),
            e @ FbError::Graph { .. } => e.to_string(),
            FbError::Http(_) => "Upstream request failed".into(),
            _ => "Internal server error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, error_code) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let mut resp = (
            status,
            Json(json!({
                "error": {
                    "message": self.message(),
                    "type": error_type,
                    "code": error_code,
                }
            })),
        )
            .into_response();
        if status == StatusCode::UNAUTHORIZED {
            resp.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        resp
    }
}

impl From<FbError> for ApiError {
    fn from(e: FbError) -> Self {
        Self(e)
    }
}
