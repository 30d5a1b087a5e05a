//! The Facebook OAuth exchange chain.

use crate::facebook;
use fbgate_config::FacebookConfig;
use fbgate_types::{FacebookAccount, FbError, GraphTransport, traits::Result};
use std::sync::Arc;

/// Drives code → short-lived token → long-lived token → profile.
///
/// Holds no per-login state, so one instance serves concurrent callbacks.
#[derive(Clone)]
pub struct FacebookOAuth {
    config: FacebookConfig,
    transport: Arc<dyn GraphTransport>,
}

impl FacebookOAuth {
    pub fn new(config: FacebookConfig, transport: Arc<dyn GraphTransport>) -> Self {
        Self { config, transport }
    }

    /// The dialog URL a user opens to grant access.
    #[must_use]
    pub fn login_url(&self) -> String {
        facebook::build_login_url(&self.config)
    }

    /// Step 1: trade an authorization code for a short-lived user token.
    ///
    /// # Errors
    ///
    /// [`FbError::Validation`] for an empty code, [`FbError::TokenExchangeFailed`]
    /// if the response has no token, or a transport error.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        if code.is_empty() {
            return Err(FbError::Validation("missing code".into()));
        }
        let json = self
            .transport
            .get_json(
                &facebook::token_endpoint(&self.config),
                &facebook::code_exchange_params(&self.config, code),
            )
            .await?;
        facebook::parse_access_token(&json)
    }

    /// Step 2: trade a short-lived token for a long-lived one.
    ///
    /// # Errors
    ///
    /// [`FbError::TokenExchangeFailed`] if the response has no token, or a
    /// transport error.
    pub async fn exchange_long_lived(&self, short_token: &str) -> Result<String> {
        let json = self
            .transport
            .get_json(
                &facebook::token_endpoint(&self.config),
                &facebook::long_lived_params(&self.config, short_token),
            )
            .await?;
        facebook::parse_access_token(&json)
    }

    /// Step 3: fetch the token owner's profile.
    ///
    /// # Errors
    ///
    /// [`FbError::Graph`] for an error payload or a profile without `id`, or
    /// a transport error.
    pub async fn fetch_profile(&self, access_token: String) -> Result<FacebookAccount> {
        let json = self
            .transport
            .get_json(
                &facebook::profile_endpoint(&self.config),
                &facebook::profile_params(&access_token),
            )
            .await?;
        facebook::parse_profile(&json, access_token)
    }

    /// Run the whole chain for a callback `code`. A failed step stops the
    /// chain; later steps are never called.
    ///
    /// # Errors
    ///
    /// The first failing step's error.
    pub async fn finalize_oauth(&self, code: &str) -> Result<FacebookAccount> {
        let short = self.exchange_code(code).await.inspect_err(|e| {
            tracing::warn!(error = %e, "code exchange failed");
        })?;
        let long = self.exchange_long_lived(&short).await.inspect_err(|e| {
            tracing::warn!(error = %e, "long-lived token exchange failed");
        })?;
        let account = self.fetch_profile(long).await?;
        tracing::info!(user_id = %account.user_id, "facebook oauth completed");
        Ok(account)
    }
}
