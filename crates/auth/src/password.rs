//! Password hashing and verification.
//!
//! New hashes are Argon2id PHC strings (`$argon2id$v=19$m=…,t=…,p=…$salt$hash`).
//! bcrypt modular-crypt strings (`$2a$` / `$2b$` / `$2y$`) are still accepted
//! when verifying, so records created by older deployments keep working; the
//! scheme is always detected from the stored string, never chosen by the
//! caller.
//!
//! Input is cut to [`MAX_PASSWORD_BYTES`] before hashing *and* before
//! verifying. The cut is on bytes, not characters, so it can split a
//! multi-byte UTF-8 sequence; the raw bytes are hashed as they are. Two
//! passwords sharing their first 72 bytes are therefore the same password.

use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
    password_hash::SaltString,
};
use fbgate_types::{FbError, traits::Result};
use rand::RngCore as _;

/// bcrypt's input ceiling, applied to every scheme.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Cost used when producing bcrypt hashes.
pub const BCRYPT_COST: u32 = 12;

/// A password hashing scheme, as identified by a hash string's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Argon2,
    Bcrypt,
}

impl HashScheme {
    /// Detect the scheme from a stored hash string.
    #[must_use]
    pub fn detect(stored: &str) -> Option<Self> {
        if stored.starts_with("$argon2") {
            Some(Self::Argon2)
        } else if ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|p| stored.starts_with(p))
        {
            Some(Self::Bcrypt)
        } else {
            None
        }
    }
}

/// The bytes that are actually hashed for `plaintext`.
#[must_use]
pub fn truncate(plaintext: &str) -> &[u8] {
    let bytes = plaintext.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns [`FbError::Hashing`] if the salt cannot be encoded or hashing
/// fails.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| FbError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(truncate(plaintext), &salt)
        .map(|h| h.to_string())
        .map_err(|e| FbError::Hashing(e.to_string()))
}

/// Hash a password with bcrypt at the given cost.
///
/// Only needed to produce legacy records (tests, migrations); new accounts
/// use [`hash_password`].
///
/// # Errors
///
/// Returns [`FbError::Hashing`] if the cost is out of range.
pub fn hash_password_bcrypt(plaintext: &str, cost: u32) -> Result<String> {
    bcrypt::hash(truncate(plaintext), cost).map_err(|e| FbError::Hashing(e.to_string()))
}

/// Check `plaintext` against a stored hash of any supported scheme.
///
/// Returns `false` on mismatch, on a malformed hash, and on an unknown
/// scheme. The comparison itself is the scheme's constant-time verify.
#[must_use]
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let candidate = truncate(plaintext);
    match HashScheme::detect(stored) {
        Some(HashScheme::Argon2) => PasswordHash::new(stored).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(candidate, &parsed)
                .is_ok()
        }),
        Some(HashScheme::Bcrypt) => bcrypt::verify(candidate, stored).unwrap_or(false),
        None => {
            tracing::warn!("stored password hash has an unrecognised scheme");
            false
        }
    }
}

/// Whether a stored hash should be replaced by a fresh Argon2id hash.
#[must_use]
pub fn needs_rehash(stored: &str) -> bool {
    HashScheme::detect(stored) != Some(HashScheme::Argon2)
}
