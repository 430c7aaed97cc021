//! Wire types shared by the HTTP handlers and the client

use serde::{Deserialize, Serialize};

/// `GET /api/listFiles` query
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    pub limit: Option<usize>,
    pub page_token: Option<String>,
}

/// One gallery entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUrl {
    pub name: String,
    pub url: String,
}

/// `GET /api/listFiles` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    pub file_urls: Vec<FileUrl>,
    /// Absent at the end of enumeration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// `POST /api/upload` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// `DELETE /api/deleteFile` query
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileQuery {
    pub file_name: Option<String>,
}

/// `DELETE /api/deleteFile` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub message: String,
}

/// `GET /api/toggleUpload` response
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadToggleState {
    pub is_upload_enabled: bool,
}

/// `POST /api/toggleUpload` body
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UploadToggleRequest {
    pub enable: bool,
}

/// `POST /api/toggleUpload` response
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadToggleResponse {
    pub success: bool,
    pub is_upload_enabled: bool,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
