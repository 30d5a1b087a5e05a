//! Media kinds and their Graph API edges on Pages and ad accounts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of media uploaded to a Facebook Page or ad account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Classify an uploaded file by its extension.
    ///
    /// `jpg`, `jpeg` and `png` (case-insensitive) are photos; everything
    /// else, including a missing extension, is uploaded as a video.
    #[must_use]
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" => Self::Photo,
            _ => Self::Video,
        }
    }

    /// The page edge the media is posted to (`photos` / `videos`).
    #[must_use]
    pub fn edge(self) -> &'static str {
        match self {
            Self::Photo => "photos",
            Self::Video => "videos",
        }
    }

    /// The ad-account edge the media is uploaded to (`adimages` /
    /// `advideos`).
    #[must_use]
    pub fn ad_edge(self) -> &'static str {
        match self {
            Self::Photo => "adimages",
            Self::Video => "advideos",
        }
    }

    /// The multipart field that carries the file on the ad-account edge.
    #[must_use]
    pub fn ad_file_field(self) -> &'static str {
        match self {
            Self::Photo => "filename",
            Self::Video => "source",
        }
    }

    /// The form field that carries the user-supplied text.
    #[must_use]
    pub fn text_field(self) -> &'static str {
        match self {
            Self::Photo => "caption",
            Self::Video => "description",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = crate::FbError;

    /// Parse a media kind name or alias.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Validation`](crate::FbError::Validation) for any
    /// other string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "photo" | "image" => Ok(Self::Photo),
            "video" => Ok(Self::Video),
            other => Err(crate::FbError::Validation(format!(
                "invalid media type '{other}', must be 'image' or 'video'"
            ))),
        }
    }
}
