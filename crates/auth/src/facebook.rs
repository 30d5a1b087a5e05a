//! Facebook Login (server-side code flow) request builders and parsers.
//!
//! Three GETs against the Graph API:
//! code → short-lived user token → long-lived user token → `/me` profile.
//! Facebook answers with JSON on both success and failure, so each step is
//! judged by the payload, never by the HTTP status.

use fbgate_config::FacebookConfig;
use fbgate_types::{FacebookAccount, FbError, traits::Result};
use serde_json::Value;

/// Permissions requested on the login dialog.
pub const SCOPES: &[&str] = &[
    "public_profile",
    "email",
    "ads_management",
    "business_management",
];

/// Profile fields fetched once the long-lived token is in hand.
pub const PROFILE_FIELDS: &str = "id,name,email";

/// `grant_type` of the short-lived → long-lived exchange.
pub const EXCHANGE_GRANT_TYPE: &str = "fb_exchange_token";

/// Build the login dialog URL the user is sent to.
#[must_use]
pub fn build_login_url(config: &FacebookConfig) -> String {
    let scope = SCOPES.join(",");
    let query = serde_urlencoded::to_string([
        ("client_id", config.app_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", scope.as_str()),
    ])
    .unwrap_or_default();
    format!(
        "{}/{}/dialog/oauth?{query}",
        config.dialog_url.trim_end_matches('/'),
        config.api_version
    )
}

/// `oauth/access_token`, used by both exchange steps.
#[must_use]
pub fn token_endpoint(config: &FacebookConfig) -> String {
    format!("{}/oauth/access_token", config.versioned_graph_url())
}

/// `me`, the profile of the token's owner.
#[must_use]
pub fn profile_endpoint(config: &FacebookConfig) -> String {
    format!("{}/me", config.versioned_graph_url())
}

/// Query for the authorization-code exchange.
#[must_use]
pub fn code_exchange_params<'a>(
    config: &'a FacebookConfig,
    code: &'a str,
) -> [(&'static str, &'a str); 4] {
    [
        ("client_id", config.app_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("client_secret", config.app_secret.as_str()),
        ("code", code),
    ]
}

/// Query for trading a short-lived token for a long-lived one.
#[must_use]
pub fn long_lived_params<'a>(
    config: &'a FacebookConfig,
    short_token: &'a str,
) -> [(&'static str, &'a str); 4] {
    [
        ("grant_type", EXCHANGE_GRANT_TYPE),
        ("client_id", config.app_id.as_str()),
        ("client_secret", config.app_secret.as_str()),
        ("fb_exchange_token", short_token),
    ]
}

/// Query for the profile lookup.
#[must_use]
pub fn profile_params(access_token: &str) -> [(&'static str, &str); 2] {
    [("access_token", access_token), ("fields", PROFILE_FIELDS)]
}

/// Extract `access_token` from an exchange response.
///
/// # Errors
///
/// Returns [`FbError::TokenExchangeFailed`] carrying the whole payload if
/// `access_token` is absent or not a non-empty string.
pub fn parse_access_token(json: &Value) -> Result<String> {
    json.get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FbError::TokenExchangeFailed(json.to_string()))
}

/// Build the account record from a `/me` response and the long-lived token.
///
/// # Errors
///
/// Returns [`FbError::Graph`] if the payload carries an `error` object or
/// has no `id`.
pub fn parse_profile(json: &Value, access_token: String) -> Result<FacebookAccount> {
    if let Some(err) = FbError::from_graph_payload(json) {
        return Err(err);
    }
    let user_id = match json.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(FbError::Graph {
                message: "profile response has no id".into(),
                kind: "N/A".into(),
                code: "N/A".into(),
            });
        }
    };
    let text = |key: &str| json.get(key).and_then(Value::as_str).map(str::to_string);
    Ok(FacebookAccount {
        user_id,
        name: text("name"),
        email: text("email"),
        access_token,
    })
}
