//! Local credential records and the Facebook identity returned by OAuth.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A local account, keyed by e-mail.
///
/// `password_hash` is always a self-describing hash string (`$argon2id$…` or
/// `$2b$…`), never the plaintext. The page id and page token are the
/// delegation used for media uploads.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub fb_page_id: String,
    pub fb_page_access_token: String,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("fb_page_id", &self.fb_page_id)
            .field("fb_page_access_token", &"<redacted>")
            .finish()
    }
}

/// Outcome of a completed Facebook OAuth exchange.
///
/// `name` and `email` are whatever the profile endpoint returned; Facebook
/// omits `email` when the user did not grant it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacebookAccount {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Long-lived user access token.
    pub access_token: String,
}
