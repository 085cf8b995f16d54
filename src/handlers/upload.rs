use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use serde::Serialize;

use crate::errors::{AppError, Result};
use crate::models::media::MediaKind;
use crate::state::AppState;

pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const MAX_VIDEO_SIZE: usize = 100 * 1024 * 1024; // 100MB

const IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
const VIDEO_TYPES: [&str; 3] = ["video/mp4", "video/webm", "video/quicktime"];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub secure_url: String,
    pub public_id: String,
    pub resource_type: MediaKind,
}

/// Sniff the payload rather than trusting the client's content type.
pub fn classify(data: &[u8]) -> Result<(MediaKind, &'static str)> {
    let detected = infer::get(data).ok_or(AppError::InvalidMediaFormat)?;
    let mime = detected.mime_type();

    let (kind, limit) = if IMAGE_TYPES.contains(&mime) {
        (MediaKind::Image, MAX_IMAGE_SIZE)
    } else if VIDEO_TYPES.contains(&mime) {
        (MediaKind::Video, MAX_VIDEO_SIZE)
    } else {
        return Err(AppError::InvalidMediaFormat);
    };

    if data.len() > limit {
        return Err(AppError::FileTooLarge);
    }
    Ok((kind, mime))
}

pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let uploader = state
        .uploader
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("Media uploads are not configured".to_string()))?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = sanitize_file_name(field.file_name().unwrap_or("upload"));
        let data = field.bytes().await?;
        file = Some((file_name, data));
        break;
    }

    let (file_name, data) = file.ok_or(AppError::NoFileProvided)?;
    if data.is_empty() {
        return Err(AppError::NoFileProvided);
    }

    let (kind, mime) = classify(&data)?;
    tracing::info!("📤 Uploading {} ({:?}, {} bytes)", file_name, kind, data.len());

    let uploaded = uploader.upload(data.to_vec(), &file_name, mime, kind).await?;

    tracing::info!("✅ Uploaded {}", uploaded.public_id);
    Ok(Json(UploadResponse {
        success: true,
        url: uploaded.secure_url.clone(),
        secure_url: uploaded.secure_url,
        public_id: uploaded.public_id,
        resource_type: uploaded.kind,
    }))
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
