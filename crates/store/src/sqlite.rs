//! SQLite-backed Facebook account store using sqlx.
//!
//! Schema: `facebook_accounts(user_id, name, email, access_token, created_at, updated_at)`
//! with `user_id` as primary key. Saving an existing user id replaces the
//! profile fields and the long-lived token.

use async_trait::async_trait;
use fbgate_types::{AccountStore, FacebookAccount, traits::Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;

/// A persistent [`AccountStore`] backed by `SQLite`.
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    /// Connects to a `SQLite` database (e.g. `"sqlite:./fbgate.db"` or `"sqlite::memory:"`).
    ///
    /// Automatically creates the database file if it does not exist and
    /// creates the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`sqlx::Error`] if the connection or table creation fails.
    pub async fn new(database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `:memory:` is a separate database.
        let max = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max)
            .connect_with(opts)
            .await?;
        Self::migrate(&pool).await?;
        tracing::debug!(url = database_url, "account store ready");
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS facebook_accounts (
                user_id      TEXT    PRIMARY KEY NOT NULL,
                name         TEXT,
                email        TEXT,
                access_token TEXT    NOT NULL,
                created_at   INTEGER NOT NULL DEFAULT (unixepoch()),
                updated_at   INTEGER NOT NULL DEFAULT (unixepoch())
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    /// Upserts the account keyed by its Facebook user id.
    async fn save(&self, account: &FacebookAccount) -> Result<()> {
        sqlx::query(
            "INSERT INTO facebook_accounts (user_id, name, email, access_token)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email,
                 access_token = excluded.access_token,
                 updated_at = unixepoch()",
        )
        .bind(&account.user_id)
        .bind(account.name.as_deref())
        .bind(account.email.as_deref())
        .bind(&account.access_token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<FacebookAccount>> {
        let row: Option<(String, Option<String>, Option<String>, String)> = sqlx::query_as(
            "SELECT user_id, name, email, access_token FROM facebook_accounts WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(user_id, name, email, access_token)| FacebookAccount {
            user_id,
            name,
            email,
            access_token,
        }))
    }
}
