//! Unified error type for the fbgate workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur across fbgate crates.
#[derive(Debug, Error)]
pub enum FbError {
    /// Unknown e-mail or wrong password. The two cases are deliberately
    /// indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The session token failed signature verification, could not be
    /// decoded, or has expired.
    #[error("invalid token")]
    InvalidSignatureOrExpiry,

    /// The session token verified but carries no subject, or its subject
    /// does not resolve to a known account.
    #[error("invalid credentials")]
    UnknownSubject,

    /// A Facebook OAuth exchange step returned no `access_token`.
    ///
    /// Carries the provider's payload verbatim.
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The Graph API answered with an inline `error` object.
    #[error("Facebook API Error ({kind} {code}): {message}")]
    Graph {
        message: String,
        kind: String,
        code: String,
    },

    /// Caller-supplied input was rejected before any upstream call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// An account with the same identity key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Password hashing failed (not a mismatch; mismatches are `false`).
    #[error("password hashing error: {0}")]
    Hashing(String),

    /// Session token signing failure.
    #[error("token signing error: {0}")]
    Signing(String),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistent storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "rquest")]
impl From<rquest::Error> for FbError {
    fn from(e: rquest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for FbError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl FbError {
    /// Builds a [`FbError::Graph`] from a Graph API payload that carries an
    /// inline `error` member; `None` when the payload has no such member.
    ///
    /// The provider's message is kept verbatim. Missing `type` / `code`
    /// fields render as `N/A`.
    #[must_use]
    pub fn from_graph_payload(payload: &serde_json::Value) -> Option<Self> {
        let err = payload.get("error").filter(|e| !e.is_null())?;
        if let Some(message) = err.as_str() {
            return Some(Self::Graph {
                message: message.to_string(),
                kind: "N/A".into(),
                code: "N/A".into(),
            });
        }
        let field = |key: &str| {
            err.get(key)
                .filter(|v| !v.is_null())
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
        };
        Some(Self::Graph {
            message: field("message").unwrap_or_else(|| "Unknown Facebook Error".into()),
            kind: field("type").unwrap_or_else(|| "N/A".into()),
            code: field("code").unwrap_or_else(|| "N/A".into()),
        })
    }

    /// Returns `true` for the failures of the session-token gate.
    #[must_use]
    pub fn is_token_rejection(&self) -> bool {
        matches!(self, Self::InvalidSignatureOrExpiry | Self::UnknownSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_credentials() {
        assert_eq!(
            FbError::InvalidCredentials.to_string(),
            "invalid email or password"
        );
    }

    #[test]
    fn test_error_display_graph() {
        let err = FbError::Graph {
            message: "Invalid OAuth access token.".into(),
            kind: "OAuthException".into(),
            code: "190".into(),
        };
        assert_eq!(
            err.to_string(),
            "Facebook API Error (OAuthException 190): Invalid OAuth access token."
        );
    }

    #[test]
    fn test_error_display_token_exchange_keeps_payload() {
        let err = FbError::TokenExchangeFailed(r#"{"error":{"code":100}}"#.into());
        assert!(err.to_string().contains(r#"{"error":{"code":100}}"#));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid {{{").unwrap_err();
        let err: FbError = json_err.into();
        assert!(matches!(err, FbError::Serialization(_)));
    }

    #[test]
    fn test_from_graph_payload_full() {
        let payload = serde_json::json!({
            "error": {
                "message": "(#100) Invalid parameter",
                "type": "OAuthException",
                "code": 100,
                "fbtrace_id": "AbC"
            }
        });
        let err = FbError::from_graph_payload(&payload).unwrap();
        match err {
            FbError::Graph {
                message,
                kind,
                code,
            } => {
                assert_eq!(message, "(#100) Invalid parameter");
                assert_eq!(kind, "OAuthException");
                assert_eq!(code, "100");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_from_graph_payload_defaults() {
        let err = FbError::from_graph_payload(&serde_json::json!({"error": {}})).unwrap();
        assert_eq!(
            err.to_string(),
            "Facebook API Error (N/A N/A): Unknown Facebook Error"
        );
    }

    #[test]
    fn test_from_graph_payload_string_error() {
        let err =
            FbError::from_graph_payload(&serde_json::json!({"error": "connection reset"})).unwrap();
        assert!(err.to_string().ends_with("connection reset"));
    }

    #[test]
    fn test_from_graph_payload_success_is_none() {
        assert!(FbError::from_graph_payload(&serde_json::json!({"id": "123"})).is_none());
    }

    #[test]
    fn test_is_token_rejection() {
        assert!(FbError::InvalidSignatureOrExpiry.is_token_rejection());
        assert!(FbError::UnknownSubject.is_token_rejection());
        assert!(!FbError::InvalidCredentials.is_token_rejection());
        assert!(!FbError::Http("refused".into()).is_token_rejection());
    }
}
