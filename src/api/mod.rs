//! API layer
//!
//! HTTP handlers for:
//! - Gallery listing and deletion
//! - Photo upload
//! - Upload toggle (admin view)
//! - Photo bytes for the memory backend
//! - Metrics (Prometheus)

pub mod dto;
mod files;
mod media;
pub mod metrics;
mod toggle;
mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

use crate::AppState;

pub use dto::*;
pub use metrics::metrics_router;

/// Create the `/api` router
///
/// Routes:
/// - GET /listFiles - One page of photos with signed URLs
/// - POST /upload - Multipart photo upload
/// - DELETE /deleteFile - Delete a photo by name
/// - GET|POST /toggleUpload - Read or set the upload flag
pub fn api_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/listFiles", get(files::list_files))
        .route("/deleteFile", delete(files::delete_file))
        .route(
            "/upload",
            post(upload::upload_photo).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(upload::MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route(
            "/toggleUpload",
            get(toggle::get_toggle)
                .post(toggle::set_toggle)
                .fallback(toggle::method_not_allowed),
        )
}

/// Create the `/media` router (memory backend only)
pub fn media_router() -> Router<AppState> {
    Router::new().route("/media/*key", get(media::serve_media))
}
