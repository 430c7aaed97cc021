//! Gallery view state
//!
//! Accumulates pages from `listFiles` in server order, skipping keys already
//! shown, and tracks per-photo load state and the pending delete.

use std::collections::HashSet;

use super::{ApiClient, ClientError, Download};
use crate::api::dto::FileUrl;

/// Load state of a single thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Loading,
    Loaded,
    Failed,
}

/// One photo in the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub name: String,
    pub url: String,
    pub state: ItemState,
}

/// Infinite-scroll gallery over an [`ApiClient`]
#[derive(Debug)]
pub struct GalleryController {
    client: ApiClient,
    page_size: Option<usize>,
    items: Vec<GalleryItem>,
    seen: HashSet<String>,
    cursor: Option<String>,
    exhausted: bool,
    pending_delete: Option<String>,
}

impl GalleryController {
    /// `page_size` of `None` uses the server default
    pub fn new(client: ApiClient, page_size: Option<usize>) -> Self {
        Self {
            client,
            page_size,
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            exhausted: false,
            pending_delete: None,
        }
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// True once the server reported no further pages
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Fetch the next page and append unseen photos.
    ///
    /// Returns how many items were added. A no-op once exhausted.
    pub async fn load_more(&mut self) -> Result<usize, ClientError> {
        if self.exhausted {
            return Ok(0);
        }

        let page = self
            .client
            .list_files(self.page_size, self.cursor.as_deref())
            .await?;

        let added = self.merge_page(page.file_urls);
        match page.next_page_token {
            Some(token) => self.cursor = Some(token),
            None => {
                self.cursor = None;
                self.exhausted = true;
            }
        }

        tracing::debug!(
            added,
            total = self.items.len(),
            exhausted = self.exhausted,
            "Gallery page loaded"
        );
        Ok(added)
    }

    /// Drop everything and load the first page again
    pub async fn refresh(&mut self) -> Result<usize, ClientError> {
        self.items.clear();
        self.seen.clear();
        self.cursor = None;
        self.exhausted = false;
        self.pending_delete = None;
        self.load_more().await
    }

    fn merge_page(&mut self, files: Vec<FileUrl>) -> usize {
        let before = self.items.len();
        for file in files {
            if self.seen.insert(file.name.clone()) {
                self.items.push(GalleryItem {
                    name: file.name,
                    url: file.url,
                    state: ItemState::Loading,
                });
            }
        }
        self.items.len() - before
    }

    fn set_state(&mut self, name: &str, state: ItemState) -> bool {
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(item) => {
                item.state = state;
                true
            }
            None => false,
        }
    }

    pub fn mark_loaded(&mut self, name: &str) -> bool {
        self.set_state(name, ItemState::Loaded)
    }

    pub fn mark_failed(&mut self, name: &str) -> bool {
        self.set_state(name, ItemState::Failed)
    }

    /// Ask for confirmation before deleting `name`
    pub fn request_delete(&mut self, name: &str) -> Result<(), ClientError> {
        if !self.seen.contains(name) {
            return Err(ClientError::NotFound);
        }
        self.pending_delete = Some(name.to_string());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the pending photo.
    ///
    /// The item leaves the gallery before the request is sent and stays gone
    /// if the request fails; the error is returned for display only.
    pub async fn confirm_delete(&mut self) -> Result<Option<String>, ClientError> {
        let Some(name) = self.pending_delete.take() else {
            return Ok(None);
        };

        self.items.retain(|item| item.name != name);
        self.seen.remove(&name);

        match self.client.delete_file(&name).await {
            Ok(_) => Ok(Some(name)),
            Err(error) => {
                tracing::warn!(%name, %error, "Delete failed after removing photo from gallery");
                Err(error)
            }
        }
    }

    /// Fetch the full-size bytes of a listed photo
    pub async fn download(&self, name: &str) -> Result<Download, ClientError> {
        let item = self.item(name).ok_or(ClientError::NotFound)?;
        self.client.download(&item.url).await
    }
}
