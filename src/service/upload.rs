//! Upload service
//!
//! Server half of the upload pipeline: flag gate, type check,
//! JPEG transcode, store write, URL.

use std::sync::Arc;

use crate::error::AppError;
use crate::flags::FlagStore;
use crate::imaging::{self, JPEG_CONTENT_TYPE};
use crate::metrics::{PHOTO_BYTES_STORED, PHOTO_UPLOADS_TOTAL, UPLOAD_REJECTIONS_TOTAL};
use crate::storage::ObjectStore;

/// A photo as received from the multipart body
#[derive(Debug, Clone)]
pub struct IncomingPhoto {
    /// Original filename; used verbatim as the storage key
    pub file_name: String,
    /// MIME type declared by the client
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A photo written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub key: String,
    pub url: String,
    /// Size of the stored JPEG
    pub size: usize,
}

/// Upload service
pub struct UploadService {
    storage: Arc<dyn ObjectStore>,
    flags: Arc<dyn FlagStore>,
    jpeg_quality: u8,
}

impl UploadService {
    /// Create new upload service
    pub fn new(storage: Arc<dyn ObjectStore>, flags: Arc<dyn FlagStore>, jpeg_quality: u8) -> Self {
        Self {
            storage,
            flags,
            jpeg_quality,
        }
    }

    /// Fail with `AppError::UploadsDisabled` when the admin switched uploads off.
    pub async fn ensure_uploads_enabled(&self) -> Result<(), AppError> {
        if self.flags.is_upload_enabled().await? {
            Ok(())
        } else {
            UPLOAD_REJECTIONS_TOTAL.with_label_values(&["disabled"]).inc();
            Err(AppError::UploadsDisabled)
        }
    }

    /// Validate, transcode and store one photo.
    ///
    /// # Steps
    /// 1. Re-check the MIME type (the client check is not trusted)
    /// 2. Transcode to JPEG at the configured quality
    /// 3. Write under the original filename, replacing any existing object
    /// 4. Return the public URL
    ///
    /// The flag gate is checked separately by [`Self::ensure_uploads_enabled`]
    /// so that a disabled upload is refused before the body is read.
    pub async fn store(&self, photo: IncomingPhoto) -> Result<StoredPhoto, AppError> {
        let key = photo.file_name;
        if key.is_empty() {
            UPLOAD_REJECTIONS_TOTAL.with_label_values(&["missing_name"]).inc();
            return Err(AppError::Validation("Missing file name".to_string()));
        }

        if !imaging::is_allowed_image_type(&photo.content_type) {
            UPLOAD_REJECTIONS_TOTAL.with_label_values(&["invalid_type"]).inc();
            tracing::warn!(key = %key, content_type = %photo.content_type, "Rejected non-image upload");
            return Err(AppError::InvalidImageType(photo.content_type));
        }

        let original_size = photo.data.len();
        let jpeg = imaging::transcode_to_jpeg_blocking(photo.data, self.jpeg_quality).await?;
        let size = jpeg.len();

        self.storage
            .put(&key, jpeg, JPEG_CONTENT_TYPE)
            .await
            .map_err(|e| e.storage_context("File upload failed"))?;

        PHOTO_UPLOADS_TOTAL.inc();
        PHOTO_BYTES_STORED.inc_by(size as f64);
        tracing::info!(key = %key, original_size, size, "Photo stored");

        Ok(StoredPhoto {
            url: self.storage.public_url(&key),
            key,
            size,
        })
    }
}
