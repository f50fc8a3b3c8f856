/// Object storage client for binary assets
///
/// The service talks to the external object store through the `ObjectStore`
/// trait; the production implementation is S3 (or any S3-compatible store via
/// a custom endpoint). Uploads mint a fresh key per blob, so keys are never
/// reused and a delete can never race a new upload for the same key.
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, Result};

/// Kind of binary asset held in the object store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }
}

/// A blob that exists in the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Stable external identifier (the object key)
    pub key: String,
    /// Retrieval URL for the blob
    pub url: String,
    pub kind: AssetKind,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a blob and return its key + retrieval URL
    async fn upload(&self, data: Bytes, kind: AssetKind, content_type: &str) -> Result<StoredAsset>;

    /// Delete a blob by key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// S3-backed object store
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        let public_base_url = config.public_base_url.clone().unwrap_or_else(|| {
            format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region)
        });

        Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url,
        }
    }

    /// Public retrieval URL for an object
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }

    /// Verify bucket access at startup.
    ///
    /// Uploads depend entirely on the object store, so a failure here is
    /// worth surfacing before the first request arrives.
    pub async fn health_check(&self) -> Result<()> {
        match self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, "object store connection validated");
                Ok(())
            }
            Err(e) => Err(AppError::Internal(format!(
                "object store health check failed for bucket {}: {}",
                self.bucket, e
            ))),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, data: Bytes, kind: AssetKind, content_type: &str) -> Result<StoredAsset> {
        let key = format!("{}/{}", kind.key_prefix(), Uuid::new_v4());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("403") || error_msg.contains("Forbidden") {
                    AppError::AssetUploadFailed(
                        "object store auth failed (403): check credentials".to_string(),
                    )
                } else if error_msg.contains("NoSuchBucket") {
                    AppError::AssetUploadFailed(format!("bucket not found: {}", self.bucket))
                } else {
                    AppError::AssetUploadFailed(format!("upload failed: {}", e))
                }
            })?;

        Ok(StoredAsset {
            url: self.public_url(&key),
            key,
            kind,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // delete_object succeeds for absent keys, so this is already idempotent
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("object store delete failed: {}", e)))?;

        Ok(())
    }
}

/// Initialize the S3 client with credentials from config.
///
/// Falls back to the default credential chain when no explicit keys are
/// provided; a custom endpoint supports S3-compatible stores such as MinIO.
pub async fn get_object_store(config: &StorageConfig) -> Result<S3ObjectStore> {
    use aws_config::timeout::TimeoutConfig;
    use aws_sdk_s3::config::Region;
    use std::time::Duration;

    // Every store call gets a bounded timeout; a hung upload surfaces as an
    // upload failure instead of stalling the operation
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(120))
        .operation_attempt_timeout(Duration::from_secs(60))
        .build();

    let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .timeout_config(timeouts);

    if let (Some(access_key_id), Some(secret_access_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        use aws_sdk_s3::config::Credentials;

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "platform_service_s3",
        );

        aws_config_builder = aws_config_builder.credentials_provider(credentials);
    }

    if let Some(endpoint) = &config.endpoint {
        aws_config_builder = aws_config_builder.endpoint_url(endpoint);
    }

    let aws_config = aws_config_builder.load().await;
    let client = Client::new(&aws_config);

    Ok(S3ObjectStore::new(client, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_prefix_by_kind() {
        assert_eq!(AssetKind::Image.key_prefix(), "images");
        assert_eq!(AssetKind::Video.key_prefix(), "videos");
    }
}
