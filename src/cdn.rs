//! Client for the image CDN that hosts menu item photos.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::config::CdnConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

pub type CdnResult<T> = Result<T, CdnError>;

#[derive(Debug, Error)]
pub enum CdnError {
    #[error("image hosting is not configured")]
    NotConfigured,
    #[error("CDN rejected the request: {0}")]
    Rejected(String),
    #[error("CDN request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Image accepted by the CDN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

/// File received from the admin panel, ready to forward to the CDN.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Operations the admin panel needs from an image host.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, upload: ImageUpload) -> CdnResult<UploadedImage>;
    async fn destroy(&self, public_id: &str) -> CdnResult<()>;
}

/// Signature for an authenticated CDN call: parameters sorted by key,
/// joined as `k=v` with `&`, the secret appended, SHA-1, lower-case hex.
pub fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut payload = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    payload.push_str(secret);

    let digest = Sha1::digest(payload.as_bytes());
    format!("{digest:x}")
}

#[derive(Clone)]
pub struct CdnClient {
    http: Client,
    config: CdnConfig,
}

#[derive(Debug, Deserialize)]
struct DestroyPayload {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

async fn rejection(response: Response) -> CdnError {
    let status = response.status();
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.to_string());
    CdnError::Rejected(message)
}

impl CdnClient {
    pub fn new(config: CdnConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{API_BASE}/{}/image/{action}", self.config.cloud_name)
    }
}

#[async_trait]
impl ImageHost for CdnClient {
    async fn upload(&self, upload: ImageUpload) -> CdnResult<UploadedImage> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone());

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(response.json::<UploadedImage>().await?)
    }

    async fn destroy(&self, public_id: &str) -> CdnResult<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let form = Form::new()
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let payload = response.json::<DestroyPayload>().await?;
        if payload.result == "ok" {
            Ok(())
        } else {
            Err(CdnError::Rejected(payload.result))
        }
    }
}
