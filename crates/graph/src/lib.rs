//! Graph API client: the HTTP transport shared by the OAuth chain, page
//! and ad-account media uploads, and ad-object management.
//!
//! Every response goes through [`GraphHttp::check_inline_error`], so callers
//! see Facebook's `{"error": {...}}` payloads as [`FbError::Graph`]
//! regardless of the HTTP status they arrived with.
//!
//! [`FbError::Graph`]: fbgate_types::FbError::Graph

pub mod ads;
pub mod http;
pub mod media;

pub use ads::{AdInput, AdSetInput, CampaignInput, VideoAdInput};
pub use http::GraphHttp;
pub use media::{AdMedia, UploadOutcome};
