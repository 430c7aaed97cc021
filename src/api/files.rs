//! Gallery listing and deletion endpoints

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
};

use super::dto::{DeleteFileQuery, DeleteFileResponse, FileUrl, ListFilesQuery, ListFilesResponse};
use crate::AppState;
use crate::auth::AdminGuard;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::GalleryService;
use crate::storage::PageCursor;

/// GET /api/listFiles?limit=<n>&pageToken=<token>
///
/// One page of photos, each with a freshly signed URL.
pub async fn list_files(
    State(state): State<AppState>,
    query: Result<Query<ListFilesQuery>, QueryRejection>,
) -> Result<Json<ListFilesResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/api/listFiles"])
        .start_timer();

    let Query(query) =
        query.map_err(|e| AppError::Validation(format!("Invalid query: {}", e.body_text())))?;
    let cursor = query
        .page_token
        .filter(|token| !token.is_empty())
        .map(PageCursor::new);

    let service = GalleryService::new(state.storage.clone(), &state.config.listing);
    let page = service.list_page(cursor, query.limit).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/listFiles", "200"])
        .inc();

    Ok(Json(ListFilesResponse {
        file_urls: page
            .entries
            .into_iter()
            .map(|entry| FileUrl {
                name: entry.name,
                url: entry.url,
            })
            .collect(),
        next_page_token: page.next_cursor.map(PageCursor::into_string),
    }))
}

/// DELETE /api/deleteFile?fileName=<name>
pub async fn delete_file(
    State(state): State<AppState>,
    _admin: AdminGuard,
    query: Result<Query<DeleteFileQuery>, QueryRejection>,
) -> Result<Json<DeleteFileResponse>, AppError> {
    let Query(query) = query.map_err(|_| AppError::Validation("Invalid file name".to_string()))?;
    let file_name = query
        .file_name
        .ok_or_else(|| AppError::Validation("Invalid file name".to_string()))?;

    let service = GalleryService::new(state.storage.clone(), &state.config.listing);
    service.delete(&file_name).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["DELETE", "/api/deleteFile", "200"])
        .inc();

    Ok(Json(DeleteFileResponse {
        message: "File deleted successfully".to_string(),
    }))
}
