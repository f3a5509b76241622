//! Object storage abstraction for avatars and delivery files.
//!
//! Files never pass through the application: clients upload directly via
//! presigned URLs and the database stores only the object key. Supports a
//! local filesystem backend for development and S3-compatible storage.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Default lifetime of presigned upload/download URLs.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// Storage configuration.
#[derive(Debug, Clone)]
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
        public_url: Option<String>,
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

impl StorageConfig {
    /// Build a storage config from the flat settings section.
    pub fn from_settings(settings: &crate::config::StorageSettings) -> AppResult<Self> {
        match settings.backend.as_str() {
            "local" => Ok(Self::Local {
                base_path: PathBuf::from(&settings.local_path),
                base_url: settings.local_url.clone(),
            }),
            "s3" => Ok(Self::S3 {
                endpoint: settings.s3_endpoint.clone(),
                bucket: settings.s3_bucket.clone(),
                region: settings.s3_region.clone(),
                access_key_id: settings.s3_access_key_id.clone(),
                secret_access_key: settings.s3_secret_access_key.clone(),
                public_url: settings.s3_public_url.clone(),
            }),
            other => Err(AppError::Config(format!("Unknown storage backend: {other}"))),
        }
    }
}

/// What an upload is for; determines the key prefix and allowed types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPurpose {
    /// Profile picture (users and creators).
    Avatar,
    /// Order delivery file (creators).
    Delivery,
}

impl UploadPurpose {
    /// Parse the wire name used by upload-URL requests.
    pub fn parse(name: &str) -> AppResult<Self> {
        match name {
            "avatar" => Ok(Self::Avatar),
            "delivery" => Ok(Self::Delivery),
            _ => Err(AppError::BadRequest("Invalid upload purpose".to_string())),
        }
    }

    /// Key prefix for this purpose.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Avatar => "avatars",
            Self::Delivery => "deliveries",
        }
    }

    /// Content types accepted for this purpose.
    #[must_use]
    pub const fn allowed_types(self) -> &'static [&'static str] {
        match self {
            Self::Avatar => &["image/jpeg", "image/png", "image/webp", "image/gif"],
            Self::Delivery => &[
                "video/mp4",
                "video/quicktime",
                "video/x-msvideo",
                "audio/mpeg",
                "audio/wav",
                "audio/mp4",
                "image/jpeg",
                "image/png",
                "image/gif",
                "application/pdf",
                "text/plain",
            ],
        }
    }
}

/// Build the object key for an upload: `{folder}/{owner_id}/{uuid}.{ext}`.
///
/// Fails with a validation error when the content type is not on the
/// purpose's allow-list.
pub fn object_key(
    purpose: UploadPurpose,
    owner_id: &str,
    object_id: &str,
    content_type: &str,
) -> AppResult<String> {
    if !purpose.allowed_types().contains(&content_type) {
        return Err(AppError::BadRequest("Unsupported file format".to_string()));
    }

    let extension = content_type.split('/').nth(1).unwrap_or("bin");
    Ok(format!(
        "{}/{}/{}.{}",
        purpose.folder(),
        owner_id,
        object_id,
        extension
    ))
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Issue a presigned URL a client can PUT the object to.
    async fn signed_upload_url(
        &self,
        key: &str,
        content_type: &str,
        ttl_secs: u64,
    ) -> AppResult<String>;

    /// Issue a presigned URL the object can be fetched from.
    async fn signed_download_url(&self, key: &str, ttl_secs: u64) -> AppResult<String>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
///
/// URLs are unsigned: the development file server under `base_url` accepts
/// direct reads and writes. Not for production use.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self { base_path, base_url }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn signed_upload_url(
        &self,
        key: &str,
        _content_type: &str,
        _ttl_secs: u64,
    ) -> AppResult<String> {
        // Ensure the parent directory exists so the dev file server can
        // accept the PUT.
        let path = self.base_path.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        Ok(self.public_url(key))
    }

    async fn signed_download_url(&self, key: &str, _ttl_secs: u64) -> AppResult<String> {
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// S3-compatible object storage backend.
#[cfg(feature = "s3")]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: Option<String>,
}

#[cfg(feature = "s3")]
impl S3Storage {
    /// Create a new S3 storage backend.
    pub fn new(
        endpoint: &str,
        bucket: String,
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
        public_url: Option<String>,
    ) -> Self {
        use aws_config::Region;
        use aws_sdk_s3::config::Credentials;

        let credentials = Credentials::new(access_key_id, secret_access_key, None, None, "shoutly");

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
        }
    }

    fn presign_config(ttl_secs: u64) -> AppResult<aws_sdk_s3::presigning::PresigningConfig> {
        aws_sdk_s3::presigning::PresigningConfig::expires_in(std::time::Duration::from_secs(
            ttl_secs,
        ))
        .map_err(|e| AppError::Internal(format!("Invalid presign TTL: {e}")))
    }
}

#[cfg(feature = "s3")]
#[async_trait::async_trait]
impl StorageBackend for S3Storage {
    async fn signed_upload_url(
        &self,
        key: &str,
        content_type: &str,
        ttl_secs: u64,
    ) -> AppResult<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presign_config(ttl_secs)?)
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 presign failed: {e}")))?;

        Ok(presigned.uri().to_string())
    }

    async fn signed_download_url(&self, key: &str, ttl_secs: u64) -> AppResult<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presign_config(ttl_secs)?)
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 presign failed: {e}")))?;

        Ok(presigned.uri().to_string())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 delete failed: {e}")))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }
}

/// Construct the configured backend.
pub fn build_backend(config: &StorageConfig) -> AppResult<std::sync::Arc<dyn StorageBackend>> {
    match config {
        StorageConfig::Local { base_path, base_url } => Ok(std::sync::Arc::new(LocalStorage::new(
            base_path.clone(),
            base_url.clone(),
        ))),
        #[cfg(feature = "s3")]
        StorageConfig::S3 {
            endpoint,
            bucket,
            region,
            access_key_id,
            secret_access_key,
            public_url,
        } => Ok(std::sync::Arc::new(S3Storage::new(
            endpoint,
            bucket.clone(),
            region,
            access_key_id,
            secret_access_key,
            public_url.clone(),
        ))),
        #[cfg(not(feature = "s3"))]
        StorageConfig::S3 { .. } => Err(AppError::Config(
            "S3 storage requires the `s3` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_avatar() {
        let key = object_key(
            UploadPurpose::Avatar,
            "01hq3kuser",
            "d0a7c0de-1234-4321-abcd-000000000000",
            "image/png",
        )
        .unwrap();

        assert!(key.starts_with("avatars/01hq3kuser/"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_object_key_rejects_disallowed_type() {
        let err = object_key(
            UploadPurpose::Avatar,
            "01hq3kuser",
            "d0a7c0de-1234-4321-abcd-000000000000",
            "application/x-msdownload",
        )
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_delivery_accepts_video() {
        let key = object_key(
            UploadPurpose::Delivery,
            "01hq3kcreator",
            "d0a7c0de-1234-4321-abcd-000000000000",
            "video/mp4",
        )
        .unwrap();

        assert!(key.starts_with("deliveries/01hq3kcreator/"));
        assert!(key.ends_with(".mp4"));
    }

    #[test]
    fn test_purpose_parse() {
        assert_eq!(UploadPurpose::parse("avatar").unwrap(), UploadPurpose::Avatar);
        assert_eq!(
            UploadPurpose::parse("delivery").unwrap(),
            UploadPurpose::Delivery
        );
        assert!(UploadPurpose::parse("other").is_err());
    }

    #[test]
    fn test_local_public_url() {
        let storage = LocalStorage::new(PathBuf::from("/tmp/shoutly"), "/files".to_string());
        assert_eq!(
            storage.public_url("avatars/u1/x.png"),
            "/files/avatars/u1/x.png"
        );
    }
}
