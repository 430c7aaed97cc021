//! Photo upload endpoint

use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::Json,
};

use super::dto::UploadResponse;
use crate::AppState;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::{IncomingPhoto, UploadService};

/// Extra room for multipart boundaries and part headers
pub(crate) const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn file_too_large(max_bytes: usize) -> AppError {
    AppError::Validation(format!("File too large: exceeds {} bytes", max_bytes))
}

fn multipart_error(error: MultipartError, max_bytes: usize) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        file_too_large(max_bytes)
    } else {
        AppError::MultipartParse(error.body_text())
    }
}

/// Pull the first `file` field out of the body.
async fn read_photo_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<IncomingPhoto, AppError> {
    let mut photo: Option<IncomingPhoto> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some("file") || photo.is_some() {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidImageType(String::new()))?;
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Missing file name".to_string()))?;

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if data.len() + chunk.len() > max_bytes {
                return Err(file_too_large(max_bytes));
            }
            data.extend_from_slice(&chunk);
        }

        photo = Some(IncomingPhoto {
            file_name,
            content_type,
            data,
        });
    }

    photo.ok_or(AppError::MissingFile)
}

/// POST /api/upload (multipart, field `file`)
///
/// # Steps
/// 1. Refuse when uploads are disabled (before the body is read)
/// 2. Parse the multipart body and take the `file` field
/// 3. Re-validate type, transcode to JPEG, store under the original filename
/// 4. Return the photo URL
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/upload"])
        .start_timer();

    let service = UploadService::new(
        state.storage.clone(),
        state.flags.clone(),
        state.config.upload.jpeg_quality,
    );
    service.ensure_uploads_enabled().await?;

    let mut multipart = multipart.map_err(|e| AppError::MultipartParse(e.body_text()))?;
    let photo = read_photo_field(&mut multipart, state.config.upload.max_bytes).await?;
    let stored = service.store(photo).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/api/upload", "200"])
        .inc();

    Ok(Json(UploadResponse { url: stored.url }))
}
