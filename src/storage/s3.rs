//! Photo storage on an S3-compatible bucket
//!
//! Handles upload, delete, listing and signed URL generation.
//! Works with Cloudflare R2, Google Cloud Storage (interoperability API),
//! MinIO and AWS S3.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};

use super::{ObjectEntry, ObjectPage, ObjectStore, PageCursor, StoredObject, build_s3_http_client};
use crate::config::StorageConfig;
use crate::error::AppError;

/// S3-backed photo storage
pub struct S3ObjectStore {
    /// S3-compatible client
    client: S3Client,
    /// Bucket name
    bucket: String,
    /// Public URL base, e.g. "https://storage.googleapis.com/my-bucket"
    public_url: String,
}

impl S3ObjectStore {
    /// Create new storage client
    ///
    /// # Errors
    /// Returns error if credentials are missing
    pub async fn new(config: &StorageConfig) -> Result<Self, AppError> {
        use aws_sdk_s3::config::BehaviorVersion;
        use aws_sdk_s3::config::{Credentials, Region};

        let access_key_id = config
            .access_key_id
            .as_deref()
            .ok_or_else(|| AppError::Config("storage.access_key_id is required".to_string()))?;
        let secret_access_key = config.secret_access_key.as_deref().ok_or_else(|| {
            AppError::Config("storage.secret_access_key is required".to_string())
        })?;

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "guestlens-s3",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .http_client(build_s3_http_client())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = S3Client::from_conf(builder.build());
        let public_url = config
            .public_url
            .clone()
            .unwrap_or_else(|| default_public_url(config));

        tracing::info!(bucket = %config.bucket, public_url = %public_url, "S3 storage configured");

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }
}

fn default_public_url(config: &StorageConfig) -> String {
    match &config.endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
        None => format!(
            "https://{}.s3.{}.amazonaws.com",
            config.bucket, config.region
        ),
    }
}

fn to_utc(time: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    /// Upload a photo
    ///
    /// `PutObject` is all-or-nothing: a failed body transfer leaves no object behind.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        use aws_sdk_s3::primitives::ByteStream;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {}", e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::NotFound
                } else {
                    AppError::Storage(format!("S3 download failed: {}", e))
                }
            })?;

        let content_type = result
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let created_at = result
            .last_modified
            .as_ref()
            .and_then(to_utc)
            .unwrap_or_else(Utc::now);

        let data = result
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read object data: {}", e)))?;

        Ok(StoredObject {
            key: key.to_string(),
            data: data.into_bytes().to_vec(),
            content_type,
            created_at,
        })
    }

    /// Delete a photo
    ///
    /// S3 deletes are silent for missing keys, so existence is checked first.
    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    AppError::NotFound
                } else {
                    AppError::Storage(format!("S3 head failed: {}", e))
                }
            })?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {}", e)))?;

        Ok(())
    }

    async fn list(
        &self,
        cursor: Option<PageCursor>,
        limit: usize,
    ) -> Result<ObjectPage, AppError> {
        let max_keys = i32::try_from(limit).unwrap_or(i32::MAX);

        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(max_keys);
        if let Some(cursor) = cursor {
            request = request.continuation_token(cursor.into_string());
        }

        let result = request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to list objects: {}", e)))?;

        let entries = result
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| {
                let created_at = object.last_modified.as_ref().and_then(to_utc);
                object.key.map(|key| ObjectEntry {
                    key,
                    size: object.size.unwrap_or(0).max(0) as u64,
                    created_at,
                })
            })
            .collect();

        let next_cursor = if result.is_truncated.unwrap_or(false) {
            result.next_continuation_token.map(PageCursor::new)
        } else {
            None
        };

        Ok(ObjectPage {
            entries,
            next_cursor,
        })
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, AppError> {
        use aws_sdk_s3::presigning::PresigningConfig;

        let presigning_config = PresigningConfig::expires_in(ttl)
            .map_err(|e| AppError::Storage(format!("Invalid presigning config: {}", e)))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to presign URL: {}", e)))?;

        Ok(presigned.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, urlencoding::encode(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    fn storage_config(endpoint: Option<&str>) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::S3,
            bucket: "wedding".to_string(),
            endpoint: endpoint.map(str::to_string),
            region: "auto".to_string(),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            force_path_style: false,
            public_url: None,
            signing_secret: None,
            public_read: true,
        }
    }

    #[test]
    fn default_public_url_uses_endpoint_and_bucket() {
        let config = storage_config(Some("https://storage.googleapis.com/"));
        assert_eq!(
            default_public_url(&config),
            "https://storage.googleapis.com/wedding"
        );
    }

    #[test]
    fn default_public_url_falls_back_to_aws() {
        let mut config = storage_config(None);
        config.region = "eu-west-1".to_string();
        assert_eq!(
            default_public_url(&config),
            "https://wedding.s3.eu-west-1.amazonaws.com"
        );
    }

    #[tokio::test]
    async fn new_requires_credentials() {
        let mut config = storage_config(Some("https://example.r2.cloudflarestorage.com"));
        config.secret_access_key = None;
        let result = S3ObjectStore::new(&config).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn public_url_joins_key() {
        let mut config = storage_config(Some("https://example.r2.cloudflarestorage.com"));
        config.public_url = Some("https://photos.example.com/".to_string());
        let store = S3ObjectStore::new(&config).await.unwrap();
        assert_eq!(
            store.public_url("cake.jpg"),
            "https://photos.example.com/cake.jpg"
        );
    }
}
