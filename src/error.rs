//! Error types for guestlens
//!
//! All server-side errors are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// Each variant maps to one HTTP status. The response body is always
/// `{ "error": "<message>" }`; there are no structured error codes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Uploads switched off by the admin toggle (403)
    #[error("Photo uploads are disabled.")]
    UploadsDisabled,

    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Admin token missing or wrong (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Signed link expired or tampered (403)
    #[error("Access denied")]
    Forbidden,

    /// Validation error (400)
    #[error("{0}")]
    Validation(String),

    /// Multipart body carried no `file` field (400)
    #[error("No file uploaded")]
    MissingFile,

    /// MIME type outside the allowed image set (400)
    #[error("Only image files are allowed")]
    InvalidImageType(String),

    /// Method not allowed on this route (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Multipart body could not be parsed (500)
    #[error("Error parsing form")]
    MultipartParse(String),

    /// Decoding or re-encoding the image failed (500)
    #[error("Image compression failed")]
    Transcode(String),

    /// Object storage error (500)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage failure reported with a fixed guest-facing message (500)
    #[error("{message}")]
    StorageFailed {
        message: &'static str,
        detail: String,
    },

    /// Upload flag file could not be read or written (500)
    #[error("Flag store error: {0}")]
    FlagStore(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Transcode(err.to_string())
    }
}

impl AppError {
    /// Attach the guest-facing message used when a storage call fails
    ///
    /// Non-storage errors (including `NotFound`) pass through unchanged.
    pub fn storage_context(self, message: &'static str) -> Self {
        match self {
            AppError::Storage(detail) => AppError::StorageFailed { message, detail },
            other => other,
        }
    }

    /// HTTP status and metric label for this error
    pub fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::UploadsDisabled => (StatusCode::FORBIDDEN, "uploads_disabled"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::MissingFile => (StatusCode::BAD_REQUEST, "missing_file"),
            AppError::InvalidImageType(_) => (StatusCode::BAD_REQUEST, "invalid_type"),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
            AppError::MultipartParse(_) => (StatusCode::INTERNAL_SERVER_ERROR, "multipart"),
            AppError::Transcode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "transcode"),
            AppError::Storage(_) | AppError::StorageFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage")
            }
            AppError::FlagStore(_) => (StatusCode::INTERNAL_SERVER_ERROR, "flag_store"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Storage and internal details are logged but never echoed to guests.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_type) = self.status_and_type();
        let error_message = match &self {
            AppError::Storage(_) | AppError::FlagStore(_) | AppError::Config(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            AppError::Internal(_) => {
                tracing::error!(error = %self, "Unexpected error");
                "Unexpected error occurred".to_string()
            }
            AppError::StorageFailed { message, detail } => {
                tracing::error!(%detail, "{message}");
                message.to_string()
            }
            AppError::MultipartParse(detail) | AppError::Transcode(detail) => {
                tracing::error!(%detail, error = %self, "Upload processing failed");
                self.to_string()
            }
            _ => self.to_string(),
        };

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
