//! Media uploads: `POST /media/upload` posts to the caller's Page,
//! `POST /facebook/media/upload` to an ad account.

use axum::{
    Json,
    extract::{Multipart, State},
};
use bytes::Bytes;
use fbgate_graph::{AdMedia, UploadOutcome};
use fbgate_types::{FbError, MediaKind};
use std::sync::Arc;

use crate::{ApiError, AppState, extract::CurrentUser};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Multipart fields: `file` (required) and `caption` (optional).
pub async fn upload(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadOutcome>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut caption = String::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(invalid)?;
                file = Some((filename, data));
            }
            Some("caption") => caption = field.text().await.map_err(invalid)?,
            _ => {}
        }
    }

    let Some((filename, data)) = file else {
        return Err(FbError::Validation("missing file field".into()).into());
    };
    let outcome = state
        .graph
        .upload(
            &user.fb_page_id,
            &user.fb_page_access_token,
            &filename,
            data,
            &caption,
        )
        .await?;
    Ok(Json(outcome))
}

/// Multipart fields: `account_id`, `media_type` (`image` or `video`),
/// `access_token` and `file`, all required.
pub async fn upload_ad_media(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AdMedia>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut account_id = None;
    let mut media_type = None;
    let mut access_token = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(invalid)?;
                file = Some((filename, data));
            }
            Some("account_id") => account_id = Some(field.text().await.map_err(invalid)?),
            Some("media_type") => media_type = Some(field.text().await.map_err(invalid)?),
            Some("access_token") => access_token = Some(field.text().await.map_err(invalid)?),
            _ => {}
        }
    }

    let kind: MediaKind = required(media_type, "media_type")?.parse()?;
    let account_id = required(account_id, "account_id")?;
    let access_token = required(access_token, "access_token")?;
    let Some((filename, data)) = file else {
        return Err(FbError::Validation("missing file field".into()).into());
    };
    let media = state
        .graph
        .upload_ad_media(&account_id, kind, &access_token, &filename, data)
        .await?;
    Ok(Json(media))
}

fn required(value: Option<String>, field: &str) -> Result<String, FbError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FbError::Validation(format!("missing {field} field")))
}

fn invalid(e: axum::extract::multipart::MultipartError) -> ApiError {
    FbError::Validation(e.body_text()).into()
}
