//! HTTP client for guests and the admin view
//!
//! Mirrors what the browser does: check the upload switch, validate and
//! compress the picked photo, send it as multipart with byte-level progress,
//! then browse the gallery page by page.

mod gallery;

pub use gallery::{GalleryController, GalleryItem, ItemState};

use std::time::Duration;

use futures::StreamExt;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::api::dto::{
    DeleteFileResponse, ErrorResponse, ListFilesResponse, UploadResponse, UploadToggleRequest,
    UploadToggleResponse, UploadToggleState,
};
use crate::error::AppError;
use crate::imaging::{Compressor, SelectedFile, is_allowed_image_type};
use crate::progress::ProgressReporter;

/// Size of each body chunk; one progress event per chunk
const UPLOAD_CHUNK_BYTES: usize = 16 * 1024;

/// Client-side failures
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Only image files are allowed (got {0:?})")]
    InvalidType(String),

    #[error("Photo uploads are disabled")]
    UploadsDisabled,

    #[error("Compression failed: {0}")]
    Compression(#[source] AppError),

    #[error("Not found")]
    NotFound,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// URL returned by the server
    pub url: String,
    /// Preview of what was sent
    pub preview_data_url: String,
    pub original_bytes: usize,
    pub sent_bytes: usize,
}

/// Downloaded photo
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// guestlens API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    admin_token: Option<String>,
    compressor: Compressor,
}

impl ApiClient {
    /// Client for the server at `base_url` (e.g. "https://photos.example.com")
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("guestlens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        Self::with_http_client(base_url, http)
    }

    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            admin_token: None,
            compressor: Compressor::default(),
        })
    }

    /// Send `token` as a bearer token on admin calls
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = compressor;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn admin(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.admin_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map a non-2xx response to a `ClientError`.
    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        match status {
            StatusCode::FORBIDDEN if message.contains("disabled") => ClientError::UploadsDisabled,
            StatusCode::NOT_FOUND => ClientError::NotFound,
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::BAD_REQUEST => ClientError::Rejected(message),
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// GET /api/toggleUpload
    pub async fn upload_enabled(&self) -> Result<bool, ClientError> {
        let response = self
            .http
            .get(self.endpoint("api/toggleUpload")?)
            .send()
            .await?;
        let state: UploadToggleState = Self::checked(response).await?.json().await?;
        Ok(state.is_upload_enabled)
    }

    /// POST /api/toggleUpload
    pub async fn set_upload_enabled(&self, enable: bool) -> Result<bool, ClientError> {
        let request = self
            .http
            .post(self.endpoint("api/toggleUpload")?)
            .json(&UploadToggleRequest { enable });
        let response = self.admin(request).send().await?;
        let body: UploadToggleResponse = Self::checked(response).await?.json().await?;
        Ok(body.is_upload_enabled)
    }

    /// GET /api/listFiles
    pub async fn list_files(
        &self,
        limit: Option<usize>,
        page_token: Option<&str>,
    ) -> Result<ListFilesResponse, ClientError> {
        let mut url = self.endpoint("api/listFiles")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let response = self.http.get(url).send().await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    /// DELETE /api/deleteFile
    pub async fn delete_file(&self, name: &str) -> Result<String, ClientError> {
        let mut url = self.endpoint("api/deleteFile")?;
        url.query_pairs_mut().append_pair("fileName", name);

        let response = self.admin(self.http.delete(url)).send().await?;
        let body: DeleteFileResponse = Self::checked(response).await?.json().await?;
        Ok(body.message)
    }

    /// Fetch the bytes behind a photo URL (signed or public)
    pub async fn download(&self, url: &str) -> Result<Download, ClientError> {
        let response = Self::checked(self.http.get(url).send().await?).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?.to_vec();
        Ok(Download { content_type, data })
    }

    /// Validate, compress and upload one photo.
    ///
    /// # Steps
    /// 1. Reject a disallowed MIME type (no network traffic)
    /// 2. Refuse when the server reports uploads disabled
    /// 3. Compress; `compression` reaches 100 before anything is sent
    /// 4. Send as multipart; `transfer` follows the bytes handed to the socket
    pub async fn upload(
        &self,
        file: SelectedFile,
        compression: ProgressReporter,
        transfer: ProgressReporter,
    ) -> Result<UploadOutcome, ClientError> {
        if !is_allowed_image_type(&file.content_type) {
            return Err(ClientError::InvalidType(file.content_type));
        }

        if !self.upload_enabled().await? {
            return Err(ClientError::UploadsDisabled);
        }

        let compressed = self
            .compressor
            .compress_blocking(file, compression)
            .await
            .map_err(|e| match e {
                AppError::InvalidImageType(ty) => ClientError::InvalidType(ty),
                other => ClientError::Compression(other),
            })?;

        let sent_bytes = compressed.file.data.len();
        let url = self.send_file(compressed.file, transfer).await?;

        Ok(UploadOutcome {
            url,
            preview_data_url: compressed.preview_data_url,
            original_bytes: compressed.original_bytes,
            sent_bytes,
        })
    }

    /// Upload a file as-is, without compression.
    ///
    /// Only the MIME check runs client-side; the server still gates on the
    /// upload switch.
    pub async fn upload_uncompressed(
        &self,
        file: SelectedFile,
        transfer: ProgressReporter,
    ) -> Result<String, ClientError> {
        if !is_allowed_image_type(&file.content_type) {
            return Err(ClientError::InvalidType(file.content_type));
        }
        self.send_file(file, transfer).await
    }

    async fn send_file(
        &self,
        file: SelectedFile,
        mut transfer: ProgressReporter,
    ) -> Result<String, ClientError> {
        let total = file.data.len() as u64;
        let chunks: Vec<Vec<u8>> = file
            .data
            .chunks(UPLOAD_CHUNK_BYTES)
            .map(<[u8]>::to_vec)
            .collect();

        transfer.report(0);
        let mut sent = 0u64;
        let body = reqwest::Body::wrap_stream(futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            transfer.report_fraction(sent, total);
            Ok::<_, std::io::Error>(chunk)
        }));

        let part = reqwest::multipart::Part::stream_with_length(body, total)
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("api/upload")?)
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = Self::checked(response).await?.json().await?;

        tracing::debug!(name = %file.name, url = %body.url, "Upload finished");
        Ok(body.url)
    }
}
