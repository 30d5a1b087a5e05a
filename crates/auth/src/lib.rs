//! Local credential handling and the Facebook OAuth exchange.
//!
//! - [`password`] hashes and verifies passwords (Argon2id by default, bcrypt
//!   accepted for legacy records).
//! - [`session`] issues and validates HS256 session tokens.
//! - [`manager`] ties both to a [`UserStore`](fbgate_types::UserStore):
//!   login, the protected-route gate, and account seeding.
//! - [`facebook`] builds the URLs and parameters of the Facebook OAuth
//!   endpoints and parses their responses; [`flow`] runs the
//!   code → short-lived → long-lived → profile chain.

pub mod facebook;
pub mod flow;
pub mod manager;
pub mod password;
pub mod session;

pub use flow::FacebookOAuth;
pub use manager::{CredentialManager, NewAccount};
pub use session::{SessionClaims, SessionManager};
