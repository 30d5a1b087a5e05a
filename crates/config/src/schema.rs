use fbgate_types::FbError;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, path::Path};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "FBGATE_";

/// Longest accepted session lifetime: one year.
pub const MAX_TTL_MINUTES: u64 = 366 * 24 * 60;

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_api_version() -> String {
    "v23.0".to_string()
}
fn default_graph_url() -> String {
    "https://graph.facebook.com".to_string()
}
fn default_dialog_url() -> String {
    "https://www.facebook.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_ttl_minutes() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Accepts a string or a bare number. Environment overrides are parsed as
/// typed values, so `FBGATE_FACEBOOK__APP_ID=1234567890` arrives as an
/// integer.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Facebook application settings used by the OAuth chain and Graph calls.
#[derive(Clone, Serialize, Deserialize)]
pub struct FacebookConfig {
    /// Application (client) id.
    #[serde(default, deserialize_with = "string_or_number")]
    pub app_id: String,
    /// Application (client) secret.
    #[serde(default, deserialize_with = "string_or_number")]
    pub app_secret: String,
    /// Redirect URI registered for the OAuth callback.
    #[serde(default)]
    pub redirect_uri: String,
    /// Graph API version segment (defaults to `v23.0`).
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Graph API base URL, without version.
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    /// Base URL of the OAuth login dialog.
    #[serde(default = "default_dialog_url")]
    pub dialog_url: String,
    /// Per-call timeout for every outbound Graph request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            redirect_uri: String::new(),
            api_version: default_api_version(),
            graph_url: default_graph_url(),
            dialog_url: default_dialog_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FacebookConfig {
    /// Versioned Graph base, e.g. `https://graph.facebook.com/v23.0`.
    #[must_use]
    pub fn versioned_graph_url(&self) -> String {
        format!(
            "{}/{}",
            self.graph_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

impl fmt::Debug for FacebookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_version", &self.api_version)
            .field("graph_url", &self.graph_url)
            .field("dialog_url", &self.dialog_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Session token settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing key for session tokens.
    #[serde(default, deserialize_with = "string_or_number")]
    pub jwt_secret: String,
    /// Session token lifetime (defaults to 60 minutes).
    #[serde(default = "default_ttl_minutes")]
    pub token_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: default_ttl_minutes(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

/// A local account seeded at startup.
///
/// Exactly one of `password` (hashed on load) or `password_hash` (stored as
/// is, Argon2 or bcrypt) must be set.
#[derive(Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub fb_page_id: String,
    #[serde(default)]
    pub fb_page_access_token: String,
}

impl fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("fb_page_id", &self.fb_page_id)
            .finish_non_exhaustive()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen port (defaults to 8000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen address (defaults to `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub facebook: FacebookConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Accounts loaded into the user store at startup.
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// `SQLite` URL for persisting OAuth accounts; in-memory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            facebook: FacebookConfig::default(),
            auth: AuthConfig::default(),
            users: Vec::new(),
            database: None,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
    }

    /// Loads defaults, then the optional YAML file, then `FBGATE_*`
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if any layer fails to parse.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// Checks the settings required to serve requests.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Config`] naming the first missing or invalid field.
    pub fn validate(&self) -> Result<(), FbError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(FbError::Config("auth.jwt_secret must be set".into()));
        }
        if self.auth.token_ttl_minutes == 0 {
            return Err(FbError::Config(
                "auth.token_ttl_minutes must be positive".into(),
            ));
        }
        if self.auth.token_ttl_minutes > MAX_TTL_MINUTES {
            return Err(FbError::Config(format!(
                "auth.token_ttl_minutes must be at most {MAX_TTL_MINUTES}"
            )));
        }
        if self.facebook.app_id.is_empty() {
            return Err(FbError::Config("facebook.app_id must be set".into()));
        }
        if self.facebook.timeout_secs == 0 {
            return Err(FbError::Config(
                "facebook.timeout_secs must be positive".into(),
            ));
        }
        for user in &self.users {
            match (&user.password, &user.password_hash) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => {
                    return Err(FbError::Config(format!(
                        "user {} needs exactly one of password / password_hash",
                        user.email
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
port: 9000
host: "0.0.0.0"
facebook:
  app_id: "1234567890"
  app_secret: "shh"
  redirect_uri: "http://localhost:8000/oauth/callback"
auth:
  jwt_secret: "change-me"
users:
  - email: "john@example.com"
    username: "john"
    password: "secret"
    fb_page_id: "111"
    fb_page_access_token: "EAAB"
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.port, 8000);
        assert_eq!(c.host, "127.0.0.1");
        assert_eq!(c.facebook.api_version, "v23.0");
        assert_eq!(c.facebook.timeout_secs, 30);
        assert_eq!(c.auth.token_ttl_minutes, 60);
        assert!(c.users.is_empty());
        assert!(c.database.is_none());
    }

    #[test]
    fn test_from_yaml_sections() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.facebook.app_id, "1234567890");
        assert_eq!(c.facebook.api_version, "v23.0"); // default preserved
        assert_eq!(c.auth.jwt_secret, "change-me");
        assert_eq!(c.users.len(), 1);
        assert_eq!(c.users[0].password.as_deref(), Some("secret"));
        c.validate().unwrap();
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fbgate.yaml");
        std::fs::write(&path, "port: 1234\n").unwrap();
        let c = Config::from_file(&path).unwrap();
        assert_eq!(c.port, 1234);
        assert_eq!(c.host, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("fbgate.yaml", "port: 1234\nfacebook:\n  app_id: from-file\n")?;
            jail.set_env("FBGATE_PORT", "4321");
            jail.set_env("FBGATE_FACEBOOK__APP_ID", "from-env");
            let c = Config::load(Some(Path::new("fbgate.yaml")))?;
            assert_eq!(c.port, 4321);
            assert_eq!(c.facebook.app_id, "from-env");
            Ok(())
        });
    }

    #[test]
    fn test_numeric_env_values_load_as_strings() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FBGATE_FACEBOOK__APP_ID", "1234567890");
            jail.set_env("FBGATE_FACEBOOK__APP_SECRET", "42");
            jail.set_env("FBGATE_AUTH__JWT_SECRET", "987654321");
            let c = Config::load(None)?;
            assert_eq!(c.facebook.app_id, "1234567890");
            assert_eq!(c.facebook.app_secret, "42");
            assert_eq!(c.auth.jwt_secret, "987654321");
            c.validate().unwrap();
            Ok(())
        });
    }

    #[test]
    fn test_unquoted_numeric_ids_in_yaml() {
        let c = Config::from_yaml(
            "facebook:\n  app_id: 1234567890\nusers:\n  - email: a@b.c\n    username: a\n    password: x\n    fb_page_id: 111\n",
        )
        .unwrap();
        assert_eq!(c.facebook.app_id, "1234567890");
        assert_eq!(c.users[0].fb_page_id, "111");
    }

    #[test]
    fn test_versioned_graph_url() {
        let mut fb = FacebookConfig::default();
        assert_eq!(fb.versioned_graph_url(), "https://graph.facebook.com/v23.0");
        fb.graph_url = "http://127.0.0.1:9/".into();
        fb.api_version = "v17.0".into();
        assert_eq!(fb.versioned_graph_url(), "http://127.0.0.1:9/v17.0");
    }

    #[test]
    fn test_validate_rejects_missing_secret() {
        let mut c = Config::from_yaml(SAMPLE_YAML).unwrap();
        c.auth.jwt_secret.clear();
        assert!(matches!(c.validate(), Err(FbError::Config(_))));
    }

    #[test]
    fn test_validate_caps_ttl() {
        let mut c = Config::from_yaml(SAMPLE_YAML).unwrap();
        c.auth.token_ttl_minutes = MAX_TTL_MINUTES;
        c.validate().unwrap();
        c.auth.token_ttl_minutes = u64::MAX;
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("token_ttl_minutes"));
    }

    #[test]
    fn test_validate_rejects_ambiguous_seed_password() {
        let mut c = Config::from_yaml(SAMPLE_YAML).unwrap();
        c.users[0].password_hash = Some("$argon2id$...".into());
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("john@example.com"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("shh"));
        assert!(!dbg.contains("change-me"));
    }
}
