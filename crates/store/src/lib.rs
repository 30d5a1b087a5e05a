//! Storage backends for local credential records and Facebook accounts.
//!
//! Provides in-memory stores for tests and single-process deployments, and a
//! SQLite-backed store for persisting accounts obtained through OAuth.

pub mod memory;
pub mod sqlite;

pub use memory::{InMemoryAccountStore, InMemoryUserStore};
pub use sqlite::SqliteAccountStore;
