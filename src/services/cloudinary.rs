use async_trait::async_trait;
use reqwest::multipart;
use serde::Serialize;
use serde_json::Value;

use crate::config::CloudinaryConfig;
use crate::errors::{AppError, Result};
use crate::models::media::MediaKind;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadedMedia {
    pub secure_url: String,
    pub public_id: String,
    pub kind: MediaKind,
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, data: Vec<u8>, file_name: &str, mime: &str, kind: MediaKind) -> Result<UploadedMedia>;
}

#[derive(Clone)]
pub struct CloudinaryService {
    cloud_name: String,
    upload_preset: String,
    folder: String,
    client: reqwest::Client,
}

impl CloudinaryService {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            cloud_name: config.cloud_name.clone(),
            upload_preset: config.upload_preset.clone(),
            folder: "urbantales/products".to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn upload_url(&self, kind: MediaKind) -> String {
        let resource_type = match kind {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        format!(
            "https://api.cloudinary.com/v1_1/{}/{}/upload",
            self.cloud_name, resource_type
        )
    }
}

#[async_trait]
impl MediaUploader for CloudinaryService {
    /// Unsigned upload through the configured upload preset.
    async fn upload(&self, data: Vec<u8>, file_name: &str, mime: &str, kind: MediaKind) -> Result<UploadedMedia> {
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| AppError::cloudinary(e.to_string()))?;

        let form = multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.upload_url(kind))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::cloudinary(format!("Upload failed: {}", e)))?;

        let result: Value = response
            .json()
            .await
            .map_err(|e| AppError::cloudinary(format!("Failed to parse response: {}", e)))?;

        parse_upload_response(&result, kind)
    }
}

fn parse_upload_response(result: &Value, kind: MediaKind) -> Result<UploadedMedia> {
    if let Some(error) = result.get("error") {
        let error_msg = error["message"].as_str().unwrap_or("Unknown Cloudinary error");
        return Err(AppError::cloudinary(error_msg));
    }

    let secure_url = result["secure_url"]
        .as_str()
        .ok_or_else(|| AppError::cloudinary("No secure URL in response"))?
        .to_string();

    let public_id = result["public_id"]
        .as_str()
        .ok_or_else(|| AppError::cloudinary("No public ID in response"))?
        .to_string();

    Ok(UploadedMedia { secure_url, public_id, kind })
}
