//! Async traits shared across all fbgate crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `fbgate-types`, not on each other.

use crate::{CredentialRecord, FacebookAccount, FbError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, FbError>;

/// Local accounts, keyed by e-mail.
///
/// Implementations must tolerate concurrent readers (login, token
/// validation) racing with writers (seeding, hash upgrades).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up the record for `email`.
    async fn get(&self, email: &str) -> Result<Option<CredentialRecord>>;
    /// Insert or replace the record keyed by `record.email`.
    async fn put(&self, record: CredentialRecord) -> Result<()>;

    /// Insert `record` only if its e-mail is not taken yet.
    ///
    /// The default is a non-atomic get-then-put; stores that can do better
    /// should override it.
    async fn insert_new(&self, record: CredentialRecord) -> Result<()> {
        if self.get(&record.email).await?.is_some() {
            return Err(FbError::Conflict(format!(
                "account {} already exists",
                record.email
            )));
        }
        self.put(record).await
    }
}

/// Persistence for identities obtained through Facebook OAuth, keyed by the
/// Facebook user id.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist (or overwrite) the account.
    async fn save(&self, account: &FacebookAccount) -> Result<()>;
    /// Load the account for a Facebook user id.
    async fn load(&self, user_id: &str) -> Result<Option<FacebookAccount>>;
}

/// The outbound HTTP capability used to talk to the Graph API.
///
/// `get_json` returns the parsed response body whatever the HTTP status:
/// Graph reports failures inside the payload, and callers decide how to
/// surface them. Transport and decoding failures are errors.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    /// Issue a GET to `url` with the given query pairs.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value>;
}

/// Source of the current time in UNIX seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}
