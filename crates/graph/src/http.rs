//! Shared HTTP plumbing for Graph API calls.

use async_trait::async_trait;
use fbgate_config::FacebookConfig;
use fbgate_types::{FbError, GraphTransport, traits::Result};
use rquest::{Client, RequestBuilder, multipart::Form};
use serde_json::Value;
use std::time::Duration;

/// A Graph API client bound to one API version.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct GraphHttp {
    http: Client,
    base: String,
}

impl GraphHttp {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Http`] if the HTTP client cannot be constructed.
    pub fn new(config: &FacebookConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(http: Client, config: &FacebookConfig) -> Self {
        Self {
            http,
            base: config.versioned_graph_url(),
        }
    }

    /// Versioned base URL, e.g. `https://graph.facebook.com/v23.0`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Absolute URL of a Graph path such as `me/adaccounts`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Turns an inline `error` object into [`FbError::Graph`]; any other
    /// payload is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Graph`] when `payload` has a non-null `error` member.
    pub fn check_inline_error(payload: Value) -> Result<Value> {
        match FbError::from_graph_payload(&payload) {
            Some(err) => {
                tracing::warn!(error = %err, "graph api returned an error");
                Err(err)
            }
            None => Ok(payload),
        }
    }

    /// `GET {base}/{path}` with error checking.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let payload = self.get_json(&self.url(path), query).await?;
        Self::check_inline_error(payload)
    }

    /// `POST {base}/{path}?access_token=…` with a JSON body.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn post_json(&self, path: &str, access_token: &str, body: &Value) -> Result<Value> {
        tracing::debug!(path, "graph POST (json)");
        let req = self
            .http
            .post(self.url(path))
            .query(&[("access_token", access_token)])
            .json(body);
        Self::check_inline_error(Self::read_json(req).await?)
    }

    /// `POST {base}/{path}` with a form-encoded body.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value> {
        tracing::debug!(path, "graph POST (form)");
        let req = self.http.post(self.url(path)).form(form);
        Self::check_inline_error(Self::read_json(req).await?)
    }

    /// `POST {base}/{path}` with a multipart body.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Value> {
        tracing::debug!(path, "graph POST (multipart)");
        let req = self.http.post(self.url(path)).multipart(form);
        Self::check_inline_error(Self::read_json(req).await?)
    }

    /// Sends the request and parses the body as JSON whatever the status;
    /// Graph reports failures in the body.
    async fn read_json(req: RequestBuilder) -> Result<Value> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "graph response is not json");
            FbError::Http(format!("unexpected response ({status}): {text}"))
        })
    }
}

#[async_trait]
impl GraphTransport for GraphHttp {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        tracing::debug!(url, "graph GET");
        Self::read_json(self.http.get(url).query(query)).await
    }
}
