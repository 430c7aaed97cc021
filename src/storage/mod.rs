//! Object storage module
//!
//! Photos live in a key-addressed bucket behind the [`ObjectStore`] trait:
//! - `S3ObjectStore`: any S3-compatible service (R2, GCS interop, MinIO)
//! - `MemoryObjectStore`: in-process map for local development and tests

mod memory;
mod s3;
mod signing;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
pub use signing::UrlSigner;

/// Opaque continuation token for paginated enumeration
///
/// Passing a cursor back yields the next disjoint slice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// One object as seen by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of a listing; `next_cursor == None` means enumeration is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub entries: Vec<ObjectEntry>,
    pub next_cursor: Option<PageCursor>,
}

/// A stored photo with its content
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub data: Vec<u8>,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// Key-addressed binary storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a whole object, replacing any object under the same key.
    ///
    /// The object is either fully written or left untouched.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Read an object. `AppError::NotFound` when absent.
    async fn get(&self, key: &str) -> Result<StoredObject, AppError>;

    /// Delete an object. `AppError::NotFound` when absent.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Enumerate up to `limit` objects after `cursor` in the store's native order.
    async fn list(&self, cursor: Option<PageCursor>, limit: usize)
    -> Result<ObjectPage, AppError>;

    /// Time-limited read link for `key`.
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, AppError>;

    /// Permanent URL for `key` (public bucket or CDN).
    fn public_url(&self, key: &str) -> String;
}

pub(crate) fn build_s3_http_client() -> aws_sdk_s3::config::SharedHttpClient {
    use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    HyperClientBuilder::new().build(https_connector)
}
