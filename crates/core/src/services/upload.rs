//! Image uploads for projects, posts and tags.

use std::io::Cursor;

use folio_common::{
    AppError, AppResult, StorageService, UploadFolder, generate_storage_key,
};
use image::ImageReader;
use serde::Serialize;

/// Stored image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Service validating and storing uploaded images.
#[derive(Clone)]
pub struct UploadService {
    storage: StorageService,
    max_bytes: usize,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(storage: StorageService, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    /// Largest accepted upload in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate an image and store it under `folder`.
    pub async fn upload_image(
        &self,
        folder: UploadFolder,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<UploadResponse> {
        if data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }

        if data.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes",
                self.max_bytes
            )));
        }

        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Only images can be uploaded, got {content_type}"
            )));
        }

        let format = image::guess_format(data)
            .map_err(|_| AppError::Validation("Unrecognized image data".to_string()))?;
        let (width, height) = image_dimensions(data).unzip();

        let key = generate_storage_key(folder, file_name);
        let stored = self.storage.upload(&key, data, content_type).await?;

        tracing::info!(
            key = %stored.key,
            size = stored.size,
            format = ?format,
            "Stored uploaded image"
        );

        Ok(UploadResponse {
            url: stored.url,
            key: stored.key,
            size: stored.size,
            content_type: stored.content_type,
            width,
            height,
        })
    }
}

fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::LocalStorage;
    use std::sync::Arc;

    // 1x1 transparent PNG.
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn service(dir: &tempfile::TempDir, max_bytes: usize) -> UploadService {
        let storage = LocalStorage::new(dir.path().to_path_buf(), "/files".to_string());
        UploadService::new(Arc::new(storage), max_bytes)
    }

    #[tokio::test]
    async fn test_upload_png() {
        let dir = tempfile::tempdir().unwrap();
        let uploaded = service(&dir, 1024)
            .upload_image(UploadFolder::Projects, "cover.png", "image/png", PNG)
            .await
            .unwrap();

        assert!(uploaded.key.starts_with("projects/"));
        assert!(uploaded.url.starts_with("/files/projects/"));
        assert_eq!(uploaded.width, Some(1));
        assert!(dir.path().join(&uploaded.key).exists());
    }

    #[tokio::test]
    async fn test_rejects_non_image_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let err = service(&dir, 1024)
            .upload_image(UploadFolder::Posts, "notes.txt", "text/plain", b"hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejects_disguised_payload() {
        let dir = tempfile::tempdir().unwrap();
        let err = service(&dir, 1024)
            .upload_image(UploadFolder::Posts, "evil.png", "image/png", b"<?php echo 1; ?>")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejects_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let err = service(&dir, 16)
            .upload_image(UploadFolder::Tags, "icon.png", "image/png", PNG)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
