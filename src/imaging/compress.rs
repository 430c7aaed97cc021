//! Pre-upload compressor
//!
//! Shrinks a picked photo before it is sent: the longer side is capped at
//! `max_dimension` and JPEG quality is stepped down until the output fits
//! `max_bytes`. Progress runs 0..=100 and reaches 100 only on success.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use super::{JPEG_CONTENT_TYPE, SelectedFile, is_allowed_image_type};
use crate::error::AppError;
use crate::progress::ProgressReporter;

/// Compression limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Longest allowed side in pixels
    pub max_dimension: u32,
    /// Target ceiling for the encoded size
    pub max_bytes: usize,
    /// First JPEG quality tried
    pub initial_quality: u8,
    /// Lowest JPEG quality tried before giving up on the size target
    pub min_quality: u8,
    /// Quality decrement between attempts
    pub quality_step: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            max_bytes: 1024 * 1024,
            initial_quality: 90,
            min_quality: 30,
            quality_step: 10,
        }
    }
}

impl CompressOptions {
    fn qualities(&self) -> Vec<u8> {
        let floor = self.min_quality.clamp(1, 100);
        let step = self.quality_step.max(1);
        let mut quality = self.initial_quality.clamp(floor, 100);
        let mut qualities = vec![quality];
        while quality > floor {
            quality = quality.saturating_sub(step).max(floor);
            qualities.push(quality);
        }
        qualities
    }
}

/// Result of a compression run
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// Same name as the input, JPEG bytes, `image/jpeg`
    pub file: SelectedFile,
    pub width: u32,
    pub height: u32,
    /// JPEG quality that produced `file`
    pub quality: u8,
    pub original_bytes: usize,
    /// `data:image/jpeg;base64,...` for an immediate preview
    pub preview_data_url: String,
}

impl CompressedImage {
    /// True if the size target was reached
    pub fn within(&self, options: &CompressOptions) -> bool {
        self.file.data.len() <= options.max_bytes
            && self.width.max(self.height) <= options.max_dimension
    }
}

/// Pre-upload image compressor
#[derive(Debug, Clone, Copy, Default)]
pub struct Compressor {
    options: CompressOptions,
}

impl Compressor {
    pub fn new(options: CompressOptions) -> Self {
        Self { options }
    }

    /// Downsize and re-encode `file`.
    ///
    /// # Errors
    /// - `AppError::InvalidImageType` before any work if the MIME type is not allowed
    /// - `AppError::Transcode` if decoding or encoding fails
    pub fn compress(
        &self,
        file: &SelectedFile,
        progress: &mut ProgressReporter,
    ) -> Result<CompressedImage, AppError> {
        if !is_allowed_image_type(&file.content_type) {
            return Err(AppError::InvalidImageType(file.content_type.clone()));
        }
        progress.report(0);

        let decoded = image::load_from_memory(&file.data)?;
        progress.report(20);

        let max = self.options.max_dimension;
        let resized = if decoded.width() > max || decoded.height() > max {
            decoded.resize(max, max, FilterType::Triangle)
        } else {
            decoded
        };
        let rgb = resized.to_rgb8();
        progress.report(50);

        let qualities = self.options.qualities();
        let attempts = qualities.len() as u64;
        let mut best: Option<(u8, Vec<u8>)> = None;
        for (index, quality) in qualities.into_iter().enumerate() {
            let mut output = Cursor::new(Vec::new());
            JpegEncoder::new_with_quality(&mut output, quality).encode_image(&rgb)?;
            let bytes = output.into_inner();
            progress.report(50 + ((index as u64 + 1) * 45 / attempts) as u8);

            let fits = bytes.len() <= self.options.max_bytes;
            best = Some((quality, bytes));
            if fits {
                break;
            }
        }

        let (quality, data) =
            best.ok_or_else(|| AppError::Transcode("no encoding attempt was made".to_string()))?;
        if data.len() > self.options.max_bytes {
            tracing::warn!(
                name = %file.name,
                size = data.len(),
                max_bytes = self.options.max_bytes,
                "Compressed image still exceeds target size"
            );
        }
        progress.report(95);

        let preview_data_url = format!(
            "data:{};base64,{}",
            JPEG_CONTENT_TYPE,
            general_purpose::STANDARD.encode(&data)
        );
        progress.report(100);

        tracing::debug!(
            name = %file.name,
            original_bytes = file.data.len(),
            compressed_bytes = data.len(),
            quality,
            "Image compressed"
        );

        Ok(CompressedImage {
            file: SelectedFile::new(file.name.clone(), JPEG_CONTENT_TYPE, data),
            width: rgb.width(),
            height: rgb.height(),
            quality,
            original_bytes: file.data.len(),
            preview_data_url,
        })
    }

    /// Run [`Compressor::compress`] on the blocking pool.
    pub async fn compress_blocking(
        &self,
        file: SelectedFile,
        mut progress: ProgressReporter,
    ) -> Result<CompressedImage, AppError> {
        let compressor = *self;
        tokio::task::spawn_blocking(move || compressor.compress(&file, &mut progress))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
    }
}
