//! Upload toggle endpoints (admin view)

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};

use super::dto::{UploadToggleResponse, UploadToggleState};
use crate::AppState;
use crate::auth::AdminGuard;
use crate::error::AppError;

/// GET /api/toggleUpload
pub async fn get_toggle(
    State(state): State<AppState>,
) -> Result<Json<UploadToggleState>, AppError> {
    let is_upload_enabled = state.flags.is_upload_enabled().await?;
    Ok(Json(UploadToggleState { is_upload_enabled }))
}

/// POST /api/toggleUpload with `{ "enable": bool }`
///
/// Anything other than a JSON object with a boolean `enable` is a 400.
pub async fn set_toggle(
    State(state): State<AppState>,
    _admin: AdminGuard,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<UploadToggleResponse>, AppError> {
    let enable = body
        .ok()
        .and_then(|Json(value)| value.get("enable").and_then(serde_json::Value::as_bool))
        .ok_or_else(|| AppError::Validation("Invalid request".to_string()))?;

    let is_upload_enabled = state.flags.set_upload_enabled(enable).await?;

    Ok(Json(UploadToggleResponse {
        success: true,
        is_upload_enabled,
    }))
}

/// Any other method on /api/toggleUpload
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
