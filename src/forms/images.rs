use std::io::{Read, Seek, SeekFrom};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use thiserror::Error;

use crate::cdn::ImageUpload;

#[derive(Debug, Error)]
pub enum ImageFormError {
    #[error("no file was uploaded")]
    MissingFile,
    #[error("only image files can be uploaded")]
    NotAnImage,
    #[error("error reading uploaded file")]
    FileRead(#[from] std::io::Error),
    #[error("an image identifier is required")]
    MissingPublicId,
}

#[derive(MultipartForm)]
/// Multipart form carrying a single menu item photo.
pub struct UploadImageForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}

impl UploadImageForm {
    /// Read the uploaded file into an [`ImageUpload`] for the CDN.
    pub fn into_upload(mut self) -> Result<ImageUpload, ImageFormError> {
        if self.file.size == 0 {
            return Err(ImageFormError::MissingFile);
        }

        let content_type = match &self.file.content_type {
            Some(mime) if mime.type_() == "image" => mime.essence_str().to_string(),
            _ => return Err(ImageFormError::NotAnImage),
        };

        let file_name = self
            .file
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "upload".to_string());

        let handle = self.file.file.as_file_mut();
        handle.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::with_capacity(self.file.size);
        handle.read_to_end(&mut bytes)?;

        Ok(ImageUpload {
            file_name,
            content_type,
            bytes,
        })
    }
}

/// Removal request for a previously uploaded image.
#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(alias = "publicId", default)]
    pub public_id: String,
}

impl DeleteImageRequest {
    pub fn into_public_id(self) -> Result<String, ImageFormError> {
        let public_id = self.public_id.trim();
        if public_id.is_empty() {
            return Err(ImageFormError::MissingPublicId);
        }
        Ok(public_id.to_string())
    }
}
