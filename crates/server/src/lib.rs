//! HTTP layer: axum router, route handlers, and error mapping.
//!
//! Exposes local login, the Facebook OAuth login/callback pair, a
//! bearer-protected Page media upload, ad-account media uploads, and
//! ad-object management routes.

mod ads;
mod error;
mod extract;
mod login;
mod media;
mod oauth;

pub use error::ApiError;
pub use extract::CurrentUser;
pub use login::TokenResponse;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use fbgate_auth::{CredentialManager, FacebookOAuth, SessionManager};
use fbgate_config::Config;
use fbgate_graph::GraphHttp;
use fbgate_types::{AccountStore, UserStore, traits::Result};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

/// Shared application state passed to all route handlers.
pub struct AppState {
    /// Local login and the bearer-token gate.
    pub credentials: Arc<CredentialManager>,
    /// Facebook OAuth exchange chain.
    pub oauth: FacebookOAuth,
    /// Graph API client for media and ads.
    pub graph: GraphHttp,
    /// Where accounts obtained through OAuth are kept.
    pub accounts: Arc<dyn AccountStore>,
}

impl AppState {
    /// Wires the state from configuration and the two stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the Graph HTTP client cannot be built.
    pub fn new(
        config: &Config,
        users: Arc<dyn UserStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Result<Arc<Self>> {
        let sessions = SessionManager::new(
            config.auth.jwt_secret.as_bytes(),
            Duration::from_secs(config.auth.token_ttl_minutes.saturating_mul(60)),
        );
        let graph = GraphHttp::new(&config.facebook)?;
        let oauth = FacebookOAuth::new(config.facebook.clone(), Arc::new(graph.clone()));
        Ok(Arc::new(Self {
            credentials: Arc::new(CredentialManager::new(users, sessions)),
            oauth,
            graph,
            accounts,
        }))
    }
}

/// Build the full axum router.
///
/// Routes:
/// - GET  /
/// - POST /login
/// - GET  /oauth/login
/// - GET  /oauth/callback
/// - POST /media/upload                    bearer
/// - GET  /ad_accounts
/// - GET  /facebook/ad_accounts
/// - POST /facebook/campaigns/create
/// - GET  /facebook/campaigns/get
/// - POST /facebook/adsets/create
/// - POST /facebook/media/upload
/// - POST /facebook/ads/create
/// - POST /facebook/ads/create_video
pub fn make_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", post(login::login))
        .route("/oauth/login", get(oauth::login_url))
        .route("/oauth/callback", get(oauth::callback))
        .route(
            "/media/upload",
            post(media::upload).layer(DefaultBodyLimit::max(media::MAX_UPLOAD_BYTES)),
        )
        .route("/ad_accounts", get(ads::list_ad_accounts))
        .route("/facebook/ad_accounts", get(ads::raw_ad_accounts))
        .route("/facebook/campaigns/create", post(ads::create_campaign))
        .route("/facebook/campaigns/get", get(ads::get_campaign))
        .route("/facebook/adsets/create", post(ads::create_adset))
        .route(
            "/facebook/media/upload",
            post(media::upload_ad_media).layer(DefaultBodyLimit::max(media::MAX_UPLOAD_BYTES)),
        )
        .route("/facebook/ads/create", post(ads::create_ad))
        .route("/facebook/ads/create_video", post(ads::create_video_ad))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Facebook OAuth API is running" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use fbgate_auth::{NewAccount, session::DEFAULT_TTL};
    use fbgate_config::FacebookConfig;
    use fbgate_store::{InMemoryAccountStore, InMemoryUserStore};
    use fbgate_types::{FbError, GraphTransport};
    use http_body_util::BodyExt as _;
    use std::sync::Mutex;
    use tower::ServiceExt as _;

    /// Graph transport that replays canned responses.
    struct Scripted(Mutex<Vec<Value>>);

    #[async_trait]
    impl GraphTransport for Scripted {
        async fn get_json(&self, _url: &str, _query: &[(&str, &str)]) -> Result<Value> {
            let mut queue = self.0.lock().unwrap();
            if queue.is_empty() {
                return Err(FbError::Http("no scripted response".into()));
            }
            Ok(queue.remove(0))
        }
    }

    struct Harness {
        state: Arc<AppState>,
        accounts: Arc<InMemoryAccountStore>,
    }

    async fn harness(responses: Vec<Value>) -> Harness {
        let facebook = FacebookConfig {
            app_id: "app".into(),
            app_secret: "secret".into(),
            redirect_uri: "http://localhost:8000/oauth/callback".into(),
            // Unroutable: nothing in these tests may reach the network.
            graph_url: "http://127.0.0.1:9".into(),
            ..FacebookConfig::default()
        };
        let users = Arc::new(InMemoryUserStore::new());
        let accounts = Arc::new(InMemoryAccountStore::new());
        let credentials = Arc::new(CredentialManager::new(
            users,
            SessionManager::new(b"router-test-key", DEFAULT_TTL),
        ));
        credentials
            .register(NewAccount {
                email: "john@example.com".into(),
                username: "john".into(),
                password: "secret123".into(),
                fb_page_id: "111".into(),
                fb_page_access_token: "EAAB-page".into(),
            })
            .await
            .unwrap();
        let state = Arc::new(AppState {
            credentials,
            oauth: FacebookOAuth::new(
                facebook.clone(),
                Arc::new(Scripted(Mutex::new(responses))),
            ),
            graph: GraphHttp::new(&facebook).unwrap(),
            accounts: accounts.clone(),
        });
        Harness { state, accounts }
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn login_json(username: &str, password: &str) -> Request<Body> {
        let body = json!({"username": username, "password": password});
        Request::builder()
            .method("POST")
            .uri("/login")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn upload_without_file(token: Option<&str>) -> Request<Body> {
        let body = "--XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"caption\"\r\n\r\n\
                    hello\r\n\
                    --XBOUNDARY--\r\n";
        let mut req = Request::builder()
            .method("POST")
            .uri("/media/upload")
            .header("content-type", "multipart/form-data; boundary=XBOUNDARY");
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        req.body(Body::from(body)).unwrap()
    }

    fn ad_media_upload(fields: &[(&str, &str)], with_file: bool) -> Request<Body> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        if with_file {
            body.push_str(
                "--XBOUNDARY\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"cat.gif\"\r\n\
                 Content-Type: image/gif\r\n\r\n\
                 GIF89a\r\n",
            );
        }
        body.push_str("--XBOUNDARY--\r\n");
        Request::builder()
            .method("POST")
            .uri("/facebook/media/upload")
            .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_status() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state).oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await["message"],
            "Facebook OAuth API is running"
        );
    }

    #[tokio::test]
    async fn test_login_json_success() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state.clone())
            .oneshot(login_json("john@example.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["token_type"], "bearer");
        let token = json["access_token"].as_str().unwrap();
        let claims = h.state.credentials.sessions().decode(token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("john@example.com"));
    }

    #[tokio::test]
    async fn test_login_form_success() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("username=john%40example.com&password=secret123"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_failures_are_identical() {
        let h = harness(vec![]).await;
        let app = make_router(h.state);
        let wrong = app
            .clone()
            .oneshot(login_json("john@example.com", "wrongpass"))
            .await
            .unwrap();
        let ghost = app
            .oneshot(login_json("ghost@nowhere.com", "anything"))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ghost.status(), StatusCode::BAD_REQUEST);
        let (wrong, ghost) = (body_json(wrong).await, body_json(ghost).await);
        assert_eq!(wrong, ghost);
        assert_eq!(wrong["error"]["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_upload_requires_bearer() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(upload_without_file(None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        assert_eq!(body_json(resp).await["error"]["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_upload_rejects_garbage_token() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(upload_without_file(Some("not.a.jwt")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error"]["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_subject() {
        let h = harness(vec![]).await;
        let token = h
            .state
            .credentials
            .sessions()
            .issue_for("ghost@nowhere.com")
            .unwrap();
        let resp = make_router(h.state)
            .oneshot(upload_without_file(Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(resp).await["error"]["message"],
            "Invalid credentials"
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_is_400() {
        let h = harness(vec![]).await;
        let token = h
            .state
            .credentials
            .login("john@example.com", "secret123")
            .await
            .unwrap();
        let resp = make_router(h.state)
            .oneshot(upload_without_file(Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await["error"]["message"],
            "missing file field"
        );
    }

    #[tokio::test]
    async fn test_oauth_login_url() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(get("/oauth/login"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let url = body_json(resp).await["oauth_url"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(url.starts_with("https://www.facebook.com/v23.0/dialog/oauth?"));
        assert!(url.contains("client_id=app"));
    }

    #[tokio::test]
    async fn test_oauth_callback_saves_account() {
        let h = harness(vec![
            json!({"access_token": "S1"}),
            json!({"access_token": "L1"}),
            json!({"id": "42", "name": "Ann"}),
        ])
        .await;
        let resp = make_router(h.state)
            .oneshot(get("/oauth/callback?code=abc"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["user_id"], "42");
        assert_eq!(json["access_token"], "L1");
        assert!(json["email"].is_null());

        let saved = h.accounts.load("42").await.unwrap().unwrap();
        assert_eq!(saved.access_token, "L1");
    }

    #[tokio::test]
    async fn test_oauth_callback_exchange_failure() {
        let h = harness(vec![json!({"error": {"message": "Invalid verification code format."}})])
            .await;
        let resp = make_router(h.state)
            .oneshot(get("/oauth/callback?code=bad"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "token_exchange_failed");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("Invalid verification code format.")
        );
        assert!(h.accounts.load("42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oauth_callback_denied() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(get(
                "/oauth/callback?error=access_denied&error_description=Permissions+error",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["message"], "Permissions error");
    }

    #[tokio::test]
    async fn test_create_campaign_invalid_objective() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/facebook/campaigns/create?account_id=1&name=n&objective=NOPE&access_token=t")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("Invalid objective 'NOPE'")
        );
    }

    #[tokio::test]
    async fn test_ad_media_upload_rejects_unknown_media_type() {
        let h = harness(vec![]).await;
        let req = ad_media_upload(
            &[("account_id", "1"), ("media_type", "gif"), ("access_token", "t")],
            true,
        );
        let resp = make_router(h.state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("must be 'image' or 'video'")
        );
    }

    #[tokio::test]
    async fn test_ad_media_upload_missing_fields_is_400() {
        let h = harness(vec![]).await;
        let app = make_router(h.state);
        let no_account = app
            .clone()
            .oneshot(ad_media_upload(
                &[("media_type", "image"), ("access_token", "t")],
                true,
            ))
            .await
            .unwrap();
        assert_eq!(no_account.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(no_account).await["error"]["message"],
            "missing account_id field"
        );

        let no_file = app
            .oneshot(ad_media_upload(
                &[("account_id", "1"), ("media_type", "video"), ("access_token", "t")],
                false,
            ))
            .await
            .unwrap();
        assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(no_file).await["error"]["message"], "missing file field");
    }

    #[tokio::test]
    async fn test_ad_media_upload_unreachable_graph_is_502() {
        let h = harness(vec![]).await;
        let req = ad_media_upload(
            &[("account_id", "1"), ("media_type", "image"), ("access_token", "t")],
            true,
        );
        let resp = make_router(h.state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_create_video_ad_missing_fields_returns_422() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/facebook/ads/create_video")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"ad_name":"ad","video_id":"v1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_huge_configured_ttl_does_not_overflow() {
        let mut config = Config::default();
        config.auth.jwt_secret = "k".into();
        config.auth.token_ttl_minutes = u64::MAX;
        let users = Arc::new(InMemoryUserStore::new());
        let state = AppState::new(&config, users, Arc::new(InMemoryAccountStore::new())).unwrap();
        assert_eq!(
            state.credentials.sessions().ttl(),
            Duration::from_secs(u64::MAX)
        );
        let token = state.credentials.sessions().issue_for("a@b.com").unwrap();
        assert_eq!(state.credentials.sessions().decode(&token).unwrap().exp, u64::MAX);
    }

    #[tokio::test]
    async fn test_create_adset_missing_fields_returns_422() {
        let h = harness(vec![]).await;
        let resp = make_router(h.state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/facebook/adsets/create")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"set"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
