//! Local login and the protected-route gate.
//!
//! Responsibilities:
//! - Verify e-mail/password pairs against a [`UserStore`] and issue session tokens.
//! - Mask "unknown e-mail" and "wrong password" into one failure, with a
//!   dummy verify so both paths cost about the same.
//! - Upgrade legacy (bcrypt) hashes to Argon2id after a successful login.
//! - Resolve bearer tokens to accounts for protected routes.
//! - Seed accounts at startup.
use crate::{password, session::SessionManager};
use fbgate_config::SeedUser;
use fbgate_types::{CredentialRecord, FbError, UserStore, traits::Result};
use std::sync::{Arc, OnceLock};

/// Fields of a new local account, with the password still in plaintext.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
    pub fb_page_id: String,
    pub fb_page_access_token: String,
}

pub struct CredentialManager {
    store: Arc<dyn UserStore>,
    sessions: SessionManager,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn UserStore>, sessions: SessionManager) -> Self {
        Self { store, sessions }
    }

    /// The underlying user store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// The session token issuer.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Check `email` / `password` and issue a session token for the account.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::InvalidCredentials`] if the e-mail is unknown or the
    /// password does not match, and store or signing errors otherwise.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let record = self.store.get(email).await?;
        let stored = record
            .as_ref()
            .map_or_else(|| dummy_hash().to_string(), |r| r.password_hash.clone());

        let matches = verify_blocking(password.to_string(), stored).await?;
        let Some(record) = record.filter(|_| matches) else {
            tracing::warn!("login rejected");
            return Err(FbError::InvalidCredentials);
        };

        if password::needs_rehash(&record.password_hash) {
            self.upgrade_hash(record.clone(), password).await;
        }

        let token = self.sessions.issue_for(&record.email)?;
        tracing::info!(email = %record.email, "login succeeded");
        Ok(token)
    }

    /// Resolve a bearer token to its account. Runs once per protected request.
    ///
    /// # Errors
    ///
    /// See [`SessionManager::validate_session_token`].
    pub async fn authenticate(&self, token: &str) -> Result<CredentialRecord> {
        self.sessions
            .validate_session_token(token, self.store.as_ref())
            .await
            .inspect_err(|e| {
                if e.is_token_rejection() {
                    tracing::warn!(error = %e, "bearer token rejected");
                }
            })
    }

    /// Hash the password and insert a new account.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Conflict`] if the e-mail is taken, or a hashing or
    /// store error.
    pub async fn register(&self, account: NewAccount) -> Result<CredentialRecord> {
        if account.email.is_empty() {
            return Err(FbError::Validation("email must not be empty".into()));
        }
        let password_hash = hash_blocking(account.password).await?;
        let record = CredentialRecord {
            email: account.email,
            username: account.username,
            password_hash,
            fb_page_id: account.fb_page_id,
            fb_page_access_token: account.fb_page_access_token,
        };
        self.store.insert_new(record.clone()).await?;
        Ok(record)
    }

    /// Load configured accounts into the store, returning how many were added.
    ///
    /// Plaintext seed passwords are hashed; pre-hashed ones must use a
    /// supported scheme.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Config`] for a seed without a usable password,
    /// [`FbError::Conflict`] for a duplicate e-mail, or a store error.
    pub async fn seed(&self, users: &[SeedUser]) -> Result<usize> {
        for user in users {
            match (&user.password, &user.password_hash) {
                (Some(plain), None) => {
                    self.register(NewAccount {
                        email: user.email.clone(),
                        username: user.username.clone(),
                        password: plain.clone(),
                        fb_page_id: user.fb_page_id.clone(),
                        fb_page_access_token: user.fb_page_access_token.clone(),
                    })
                    .await?;
                }
                (None, Some(hash)) if password::HashScheme::detect(hash).is_some() => {
                    self.store
                        .insert_new(CredentialRecord {
                            email: user.email.clone(),
                            username: user.username.clone(),
                            password_hash: hash.clone(),
                            fb_page_id: user.fb_page_id.clone(),
                            fb_page_access_token: user.fb_page_access_token.clone(),
                        })
                        .await?;
                }
                _ => {
                    return Err(FbError::Config(format!(
                        "seed user {} has no usable password",
                        user.email
                    )));
                }
            }
            tracing::debug!(email = %user.email, "seeded account");
        }
        Ok(users.len())
    }

    async fn upgrade_hash(&self, mut record: CredentialRecord, password: &str) {
        match hash_blocking(password.to_string()).await {
            Ok(hash) => {
                record.password_hash = hash;
                let email = record.email.clone();
                match self.store.put(record).await {
                    Ok(()) => tracing::info!(email = %email, "password hash upgraded to argon2id"),
                    Err(e) => tracing::warn!(email = %email, error = %e, "failed to store upgraded hash"),
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to rehash legacy password"),
        }
    }
}

/// An Argon2 hash nobody's password matches, verified against when the
/// e-mail is unknown.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| password::hash_password("fbgate-unknown-account").unwrap_or_default())
}

async fn verify_blocking(password: String, stored: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &stored))
        .await
        .map_err(|e| FbError::Hashing(e.to_string()))
}

async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| FbError::Hashing(e.to_string()))?
}
