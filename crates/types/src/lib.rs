//! Core types and traits for the fbgate workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! Graph API broker: the error enum, local credential records, the result of
//! the Facebook OAuth exchange, media kinds, and the async traits that the
//! store, auth and graph crates implement.

pub mod account;
pub mod error;
pub mod media;
pub mod traits;

pub use account::{CredentialRecord, FacebookAccount};
pub use error::FbError;
pub use media::MediaKind;
pub use traits::{AccountStore, Clock, GraphTransport, SystemClock, UserStore};
