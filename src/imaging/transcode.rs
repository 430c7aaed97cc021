//! Server-side JPEG transcoder
//!
//! Every stored photo is JPEG, whatever the guest sent. Alpha is dropped and
//! animated formats keep their first frame.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;

use crate::error::AppError;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Decode `data` and re-encode it as JPEG at `quality` (1..=100).
#[tracing::instrument(skip(data), fields(input_bytes = data.len()))]
pub fn transcode_to_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>, AppError> {
    let image = image::load_from_memory(data)?;
    tracing::trace!(width = image.width(), height = image.height(), "Decoded image");

    let rgb = image.to_rgb8();
    let mut output = Cursor::new(Vec::with_capacity(data.len() / 2));
    JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100)).encode_image(&rgb)?;

    let output = output.into_inner();
    tracing::trace!(output_bytes = output.len(), "Encoded JPEG");
    Ok(output)
}

/// Run [`transcode_to_jpeg`] on the blocking pool.
pub async fn transcode_to_jpeg_blocking(data: Vec<u8>, quality: u8) -> Result<Vec<u8>, AppError> {
    tokio::task::spawn_blocking(move || transcode_to_jpeg(&data, quality))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}
