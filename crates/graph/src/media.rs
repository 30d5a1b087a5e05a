//! Photo and video uploads to a Facebook Page or an ad account.

use crate::{GraphHttp, ads::act_path};
use bytes::Bytes;
use fbgate_types::{FbError, MediaKind, traits::Result};
use rquest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

/// What the upload route returns: the created object id and the raw
/// Graph response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    /// The new object's `id`, or the whole response when it has none.
    pub create_id: Value,
    pub facebook_response: Value,
}

impl UploadOutcome {
    #[must_use]
    pub fn from_response(resp: Value) -> Self {
        let create_id = resp.get("id").cloned().unwrap_or_else(|| resp.clone());
        Self {
            create_id,
            facebook_response: resp,
        }
    }
}

/// The multipart body for an upload: the file as `source`, the text under
/// the field the edge expects, and the page token.
#[must_use]
pub fn upload_form(
    kind: MediaKind,
    filename: &str,
    data: Bytes,
    text: &str,
    page_token: &str,
) -> Form {
    let source = Part::bytes(Vec::from(data)).file_name(filename.to_string());
    Form::new()
        .part("source", source)
        .text(kind.text_field(), text.to_string())
        .text("access_token", page_token.to_string())
}

/// What an ad-account upload yields, serialized as `{"image_hash": …}` or
/// `{"video_id": …}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdMedia {
    ImageHash(String),
    VideoId(String),
}

impl AdMedia {
    /// Reads an `adimages` or `advideos` response.
    ///
    /// Image responses are keyed by file name:
    /// `{"images": {"cat.png": {"hash": "…", "url": "…"}}}`.
    ///
    /// # Errors
    ///
    /// Returns [`FbError::Http`] when the response lacks the hash or id.
    pub fn from_response(kind: MediaKind, resp: &Value) -> Result<Self> {
        let found = match kind {
            MediaKind::Photo => resp
                .get("images")
                .and_then(Value::as_object)
                .and_then(|images| {
                    images
                        .values()
                        .find_map(|img| img.get("hash").and_then(Value::as_str))
                })
                .map(|hash| Self::ImageHash(hash.to_string())),
            MediaKind::Video => resp
                .get("id")
                .and_then(|id| {
                    id.as_str()
                        .map(str::to_string)
                        .or_else(|| id.as_u64().map(|n| n.to_string()))
                })
                .map(Self::VideoId),
        };
        found.ok_or_else(|| FbError::Http(format!("unexpected {kind} upload response: {resp}")))
    }
}

/// The multipart body for an ad-account upload.
#[must_use]
pub fn ad_media_form(kind: MediaKind, filename: &str, data: Bytes, access_token: &str) -> Form {
    let file = Part::bytes(Vec::from(data)).file_name(filename.to_string());
    Form::new()
        .part(kind.ad_file_field(), file)
        .text("access_token", access_token.to_string())
}

impl GraphHttp {
    /// Posts a file to `/act_{id}/adimages` or `/act_{id}/advideos`.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors, or a response without the
    /// expected hash or id.
    pub async fn upload_ad_media(
        &self,
        account_id: &str,
        kind: MediaKind,
        access_token: &str,
        filename: &str,
        data: Bytes,
    ) -> Result<AdMedia> {
        tracing::info!(account = account_id, %kind, size = data.len(), "uploading ad media");
        let path = format!("{}/{}", act_path(account_id), kind.ad_edge());
        let form = ad_media_form(kind, filename, data, access_token);
        let resp = self.post_multipart(&path, form).await?;
        AdMedia::from_response(kind, &resp)
    }

    /// Posts a file to `/{page_id}/photos` or `/{page_id}/videos`.
    ///
    /// The file is sent from memory; nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn upload(
        &self,
        page_id: &str,
        page_token: &str,
        filename: &str,
        data: Bytes,
        text: &str,
    ) -> Result<UploadOutcome> {
        let kind = MediaKind::from_filename(filename);
        tracing::info!(page_id, %kind, size = data.len(), "uploading page media");
        let form = upload_form(kind, filename, data, text, page_token);
        let resp = self
            .post_multipart(&format!("{page_id}/{}", kind.edge()), form)
            .await?;
        Ok(UploadOutcome::from_response(resp))
    }
}
