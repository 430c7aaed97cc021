//! Gallery service
//!
//! Paginated listing with freshly signed URLs, and photo deletion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::ListingConfig;
use crate::error::AppError;
use crate::metrics::{PHOTO_DELETES_TOTAL, SIGNED_URLS_TOTAL};
use crate::storage::{ObjectStore, PageCursor};

/// A listed photo with a time-limited link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEntry {
    pub name: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// One page of signed entries
#[derive(Debug, Clone, Default)]
pub struct SignedPage {
    pub entries: Vec<SignedEntry>,
    /// `None` once enumeration is exhausted
    pub next_cursor: Option<PageCursor>,
}

/// Gallery service
pub struct GalleryService {
    storage: Arc<dyn ObjectStore>,
    ttl: Duration,
    default_limit: usize,
    max_limit: usize,
}

impl GalleryService {
    /// Create new gallery service
    pub fn new(storage: Arc<dyn ObjectStore>, listing: &ListingConfig) -> Self {
        Self {
            storage,
            ttl: listing.signed_url_ttl(),
            default_limit: listing.default_limit,
            max_limit: listing.max_limit,
        }
    }

    /// Page size for a request: default when absent, clamped to `max_limit`.
    pub fn resolve_limit(&self, requested: Option<usize>) -> Result<usize, AppError> {
        match requested {
            None => Ok(self.default_limit),
            Some(0) => Err(AppError::Validation(
                "limit must be greater than 0".to_string(),
            )),
            Some(limit) => Ok(limit.min(self.max_limit)),
        }
    }

    /// List one page and sign every entry.
    ///
    /// Signing runs concurrently for the whole page; any signing failure
    /// fails the page. Entries keep the store's native order.
    pub async fn list_page(
        &self,
        cursor: Option<PageCursor>,
        limit: Option<usize>,
    ) -> Result<SignedPage, AppError> {
        let limit = self.resolve_limit(limit)?;
        let page = self.storage.list(cursor, limit).await?;

        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("signed URL TTL out of range")))?;

        let entries = futures::future::try_join_all(page.entries.into_iter().map(|entry| async move {
            let url = self.storage.signed_url(&entry.key, self.ttl).await?;
            Ok::<_, AppError>(SignedEntry {
                name: entry.key,
                url,
                expires_at,
            })
        }))
        .await?;

        SIGNED_URLS_TOTAL.inc_by(entries.len() as u64);
        tracing::debug!(
            count = entries.len(),
            has_more = page.next_cursor.is_some(),
            "Listed photos"
        );

        Ok(SignedPage {
            entries,
            next_cursor: page.next_cursor,
        })
    }

    /// Delete one photo by key.
    ///
    /// # Errors
    /// - `AppError::Validation` for an empty key
    /// - `AppError::NotFound` when no such photo exists
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        if key.trim().is_empty() {
            return Err(AppError::Validation("Invalid file name".to_string()));
        }

        self.storage
            .delete(key)
            .await
            .map_err(|e| e.storage_context("Error deleting file"))?;

        PHOTO_DELETES_TOTAL.inc();
        tracing::info!(key = %key, "Photo deleted");
        Ok(())
    }
}
