//! Object storage abstraction for image uploads.
//!
//! Supports both local filesystem and S3-compatible object storage.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::{AppError, AppResult, IdGenerator};

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Local {
        /// Base path for stored files.
        base_path: PathBuf,
        /// Base URL for serving files.
        base_url: String,
    },
    /// S3-compatible object storage.
    S3 {
        /// S3 endpoint URL (e.g., "<https://s3.amazonaws.com>" or `MinIO` URL).
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS region.
        region: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Public URL prefix for serving files.
        #[serde(default)]
        public_url: Option<String>,
        /// Path prefix within the bucket.
        #[serde(default)]
        prefix: Option<String>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Local {
            base_path: PathBuf::from("./files"),
            base_url: "/files".to_string(),
        }
    }
}

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path or object key).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Shared handle to the configured storage backend.
pub type StorageService = Arc<dyn StorageBackend>;

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Directory files are written under.
    #[must_use]
    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        // Keys are random; an existing file means a collision, never an overwrite.
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AppError::Conflict(format!("Storage key already exists: {key}")));
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.base_path.join(key);
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }
}

/// S3-compatible object storage backend.
#[cfg(feature = "s3")]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: Option<String>,
    prefix: Option<String>,
}

#[cfg(feature = "s3")]
impl S3Storage {
    /// Create a new S3 storage backend.
    #[must_use]
    pub fn new(
        endpoint: &str,
        bucket: String,
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
        public_url: Option<String>,
        prefix: Option<String>,
    ) -> Self {
        use aws_config::Region;
        use aws_sdk_s3::config::Credentials;

        let credentials =
            Credentials::new(access_key_id, secret_access_key, None, None, "folio");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket,
            public_url,
            prefix,
        }
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), key),
            None => key.to_string(),
        }
    }
}

#[cfg(feature = "s3")]
#[async_trait::async_trait]
impl StorageBackend for S3Storage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        use aws_sdk_s3::primitives::ByteStream;

        let full_key = self.full_key(key);
        let md5 = format!("{:x}", md5::compute(data));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .cache_control("max-age=3600")
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.full_key(key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        let full_key = self.full_key(key);
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), full_key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, full_key),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.full_key(key);

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("404") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!("S3 head_object failed: {e}")))
                }
            }
        }
    }
}

/// Build the storage backend described by the configuration.
pub fn build_storage(config: &StorageConfig) -> AppResult<StorageService> {
    match config {
        StorageConfig::Local {
            base_path,
            base_url,
        } => Ok(Arc::new(LocalStorage::new(base_path.clone(), base_url.clone()))),
        #[cfg(feature = "s3")]
        StorageConfig::S3 {
            endpoint,
            bucket,
            region,
            access_key_id,
            secret_access_key,
            public_url,
            prefix,
        } => Ok(Arc::new(S3Storage::new(
            endpoint,
            bucket.clone(),
            region,
            access_key_id,
            secret_access_key,
            public_url.clone(),
            prefix.clone(),
        ))),
        #[cfg(not(feature = "s3"))]
        StorageConfig::S3 { .. } => Err(AppError::Config(
            "S3 storage requested but folio was built without the `s3` feature".to_string(),
        )),
    }
}

/// Per-entity folder inside the storage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    /// Project covers and gallery images.
    Projects,
    /// Blog post covers.
    Posts,
    /// Tag icons.
    Tags,
}

impl UploadFolder {
    /// Folder name used as the key prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Posts => "posts",
            Self::Tags => "tags",
        }
    }
}

impl fmt::Display for UploadFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadFolder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "projects" => Ok(Self::Projects),
            "posts" => Ok(Self::Posts),
            "tags" => Ok(Self::Tags),
            other => Err(AppError::Validation(format!("Unknown upload folder: {other}"))),
        }
    }
}

/// Generate a unique storage key for an uploaded image.
///
/// Keys look like `projects/k3j9x0a1b2c3d_1718000000000.png`.
#[must_use]
pub fn generate_storage_key(folder: UploadFolder, original_name: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();

    // Extract extension from original name
    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    let stem = IdGenerator::new().generate_file_stem(13);
    format!("{folder}/{stem}_{timestamp}.{extension}")
}
