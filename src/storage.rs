use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Lifetime of a presigned upload URL.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// StorageError
///
/// Failures of the object store. Handlers turn these into a generic 500.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid presigning configuration: {0}")]
    Config(String),
    #[error("presigning failed: {0}")]
    Presign(String),
}

/// StorageService
///
/// Contract for the media store behind blog covers and whiteboard images. The S3
/// client is used in production and against local MinIO; tests use `MockStorageService`.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the bucket if it is missing. Only called in `Env::Local`.
    async fn ensure_bucket_exists(&self);

    /// Returns a URL that lets the browser `PUT` one object of `content_type` under `key`.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// S3StorageClient
///
/// `aws-sdk-s3` client configured for an S3-compatible endpoint. Path-style addressing
/// is forced so MinIO works without DNS tricks.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket on an existing bucket errors; that is the expected steady state.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "create_bucket skipped");
        }
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            // The signature covers the content type, so the browser cannot swap it.
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        Ok(presigned_req.uri().to_string())
    }
}

/// upload_key
///
/// Builds `uploads/<uuid>.<ext>` from the client's filename. Only the extension of the
/// original name survives, lowercased and limited to ASCII alphanumerics.
pub fn upload_key(filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("uploads/{}.{ext}", Uuid::new_v4()),
        None => format!("uploads/{}", Uuid::new_v4()),
    }
}

/// Media types the dashboard accepts for uploads.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// MockStorageService
///
/// Deterministic in-process stand-in for tests; `new_failing` simulates an outage.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Presign("simulated outage".to_string()));
        }
        Ok(format!(
            "http://localhost:9000/mock-bucket/{key}?signature=fake"
        ))
    }
}

/// StorageState
///
/// Shared handle to the storage service carried in `AppState`.
pub type StorageState = Arc<dyn StorageService>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_key_keeps_only_a_clean_extension() {
        let key = upload_key("../../etc/Cover.PNG");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".png"));
        assert!(!key.contains(".."));

        let bare = upload_key("README");
        assert!(!bare.contains('.'));
    }

    #[test]
    fn only_images_and_pdfs_are_accepted() {
        assert!(is_allowed_content_type("image/webp"));
        assert!(is_allowed_content_type("application/pdf"));
        assert!(!is_allowed_content_type("text/html"));
    }
}
