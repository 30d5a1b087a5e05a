//! HS256 session tokens.
//!
//! A session token is a compact JWS whose claims carry at least `sub` (the
//! account e-mail) and `exp` (UNIX seconds). Tokens are valid until `exp`;
//! there is no renewal and no revocation.

use fbgate_types::{Clock, CredentialRecord, FbError, SystemClock, UserStore, traits::Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{sync::Arc, time::Duration};

/// Default session lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Token type reported alongside issued tokens.
pub const TOKEN_TYPE: &str = "bearer";

const ALGORITHM: Algorithm = Algorithm::HS256;

/// The claims read back from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// `None` when the claim is absent or not a string.
    #[serde(
        default,
        deserialize_with = "string_subject",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,
    pub exp: u64,
}

fn string_subject<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Issues and verifies session tokens with a process-wide signing key.
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Creates a manager signing with `secret`, using the system clock.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    /// Creates a manager with an explicit clock.
    #[must_use]
    pub fn with_clock(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    /// Session lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `claims` with `exp` set to now + TTL.
    ///
    /// Any `exp` already present in `claims` is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Signing`] if the claims cannot be encoded.
    pub fn create_session_token(&self, mut claims: Map<String, Value>) -> Result<String> {
        let exp = self.clock.now().saturating_add(self.ttl.as_secs());
        claims.insert("exp".into(), Value::from(exp));
        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| FbError::Signing(e.to_string()))
    }

    /// Issue a token whose subject is `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Signing`] if the claims cannot be encoded.
    pub fn issue_for(&self, subject: &str) -> Result<String> {
        let mut claims = Map::new();
        claims.insert("sub".into(), Value::from(subject));
        self.create_session_token(claims)
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::InvalidSignatureOrExpiry`] if the token is
    /// malformed, signed with another key or algorithm, or expired.
    pub fn decode(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against our own clock below.
        validation.validate_exp = false;
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "session token rejected");
                FbError::InvalidSignatureOrExpiry
            })?;
        if data.claims.exp <= self.clock.now() {
            tracing::debug!(exp = data.claims.exp, "session token expired");
            return Err(FbError::InvalidSignatureOrExpiry);
        }
        Ok(data.claims)
    }

    /// Resolve a session token to the account it was issued for.
    ///
    /// # Errors
    ///
    /// - [`FbError::InvalidSignatureOrExpiry`] if [`decode`](Self::decode) fails;
    /// - [`FbError::UnknownSubject`] if the token has no `sub` or the subject
    ///   is not in `store`;
    /// - any error of the store itself.
    pub async fn validate_session_token(
        &self,
        token: &str,
        store: &dyn UserStore,
    ) -> Result<CredentialRecord> {
        let claims = self.decode(token)?;
        let Some(subject) = claims.sub else {
            return Err(FbError::UnknownSubject);
        };
        store.get(&subject).await?.ok_or(FbError::UnknownSubject)
    }
}
