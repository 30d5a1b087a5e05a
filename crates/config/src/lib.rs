//! Configuration loading for the fbgate service.
//!
//! Uses figment to layer, in order: built-in defaults, an optional YAML file,
//! and `FBGATE_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `FBGATE_FACEBOOK__APP_ID`). The loaded [`Config`] is immutable for
//! the lifetime of the process.

pub mod schema;

pub use schema::{AuthConfig, Config, FacebookConfig, LogConfig, SeedUser};
