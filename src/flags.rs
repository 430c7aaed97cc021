//! Upload on/off flag
//!
//! A single persisted boolean, stored as `{ "isUploadEnabled": bool }` in a
//! local JSON file. Read on every upload attempt and every admin page load;
//! written only by the admin toggle. Writes from this process are serialized;
//! across processes the last write wins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::AppError;

/// Persisted flag record
///
/// Keys other than `isUploadEnabled` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFlag {
    pub is_upload_enabled: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UploadFlag {
    pub fn new(enabled: bool) -> Self {
        Self {
            is_upload_enabled: enabled,
            extra: serde_json::Map::new(),
        }
    }
}

/// Read/write access to the upload flag
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Current value of the flag
    async fn is_upload_enabled(&self) -> Result<bool, AppError>;

    /// Persist a new value and return it
    async fn set_upload_enabled(&self, enabled: bool) -> Result<bool, AppError>;
}

/// Flag persisted in a JSON file
pub struct JsonFlagStore {
    path: PathBuf,
    default_enabled: bool,
    write_lock: Mutex<()>,
}

impl JsonFlagStore {
    pub fn new(path: impl Into<PathBuf>, default_enabled: bool) -> Self {
        Self {
            path: path.into(),
            default_enabled,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the full record; a missing file yields the configured default.
    pub async fn load(&self) -> Result<UploadFlag, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::FlagStore(format!("{} is not valid: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(UploadFlag::new(self.default_enabled))
            }
            Err(e) => Err(AppError::FlagStore(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Write the record via a temp file in the same directory and rename it into place.
    async fn save(&self, flag: &UploadFlag) -> Result<(), AppError> {
        let contents = serde_json::to_string_pretty(flag)
            .map_err(|e| AppError::FlagStore(format!("failed to encode flag: {}", e)))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, contents.as_bytes()))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    use std::io::Write;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| AppError::FlagStore(format!("failed to create temp file: {}", e)))?;
    file.write_all(contents)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| AppError::FlagStore(format!("failed to write flag: {}", e)))?;
    file.persist(path)
        .map_err(|e| AppError::FlagStore(format!("failed to replace {}: {}", path.display(), e)))?;

    Ok(())
}

#[async_trait]
impl FlagStore for JsonFlagStore {
    async fn is_upload_enabled(&self) -> Result<bool, AppError> {
        Ok(self.load().await?.is_upload_enabled)
    }

    async fn set_upload_enabled(&self, enabled: bool) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut flag = self.load().await?;
        flag.is_upload_enabled = enabled;
        self.save(&flag).await?;

        tracing::info!(enabled, path = %self.path.display(), "Upload flag updated");
        Ok(enabled)
    }
}
