//! In-memory stores backed by a `HashMap` behind a lock.

use async_trait::async_trait;
use fbgate_types::{
    AccountStore, CredentialRecord, FacebookAccount, FbError, UserStore, traits::Result,
};
use std::collections::{HashMap, hash_map::Entry};
use std::sync::{Mutex, RwLock};

/// An in-memory [`UserStore`] keyed by e-mail.
///
/// Reads (login, token validation) take a shared lock; writes (seeding,
/// password-hash upgrades) take an exclusive one.
pub struct InMemoryUserStore {
    data: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryUserStore {
    /// Creates a new empty user store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store pre-populated with `records`; later duplicates win.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let data = records
            .into_iter()
            .map(|r| (r.email.clone(), r))
            .collect();
        Self {
            data: RwLock::new(data),
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> FbError {
    FbError::Storage("user store lock poisoned".into())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, email: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.data.read().map_err(poisoned)?.get(email).cloned())
    }

    async fn put(&self, record: CredentialRecord) -> Result<()> {
        self.data
            .write()
            .map_err(poisoned)?
            .insert(record.email.clone(), record);
        Ok(())
    }

    /// Atomic under the write lock, unlike the trait default.
    async fn insert_new(&self, record: CredentialRecord) -> Result<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        match data.entry(record.email.clone()) {
            Entry::Occupied(_) => Err(FbError::Conflict(format!(
                "account {} already exists",
                record.email
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }
}

/// An in-memory [`AccountStore`] keyed by Facebook user id.
pub struct InMemoryAccountStore {
    data: Mutex<HashMap<String, FacebookAccount>>,
}

impl InMemoryAccountStore {
    /// Creates a new empty account store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    /// Saves (or overwrites) the account for its user id.
    async fn save(&self, account: &FacebookAccount) -> Result<()> {
        self.data
            .lock()
            .map_err(|_| FbError::Storage("account store lock poisoned".into()))?
            .insert(account.user_id.clone(), account.clone());
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<FacebookAccount>> {
        Ok(self
            .data
            .lock()
            .map_err(|_| FbError::Storage("account store lock poisoned".into()))?
            .get(user_id)
            .cloned())
    }
}
