//! In-process object store
//!
//! Objects live in a `BTreeMap`, so listings come back in lexicographic key
//! order. Links point at this server's `/media` route; signed links carry an
//! HMAC checked by that route.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ObjectEntry, ObjectPage, ObjectStore, PageCursor, StoredObject, UrlSigner};
use crate::error::AppError;

/// Memory-backed object store
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    /// Server base URL, e.g. "http://localhost:8080"
    base_url: String,
    signer: UrlSigner,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>, signer: UrlSigner) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer,
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn encode_cursor(key: &str) -> PageCursor {
        PageCursor::new(general_purpose::URL_SAFE_NO_PAD.encode(key.as_bytes()))
    }

    fn decode_cursor(cursor: &PageCursor) -> Result<String, AppError> {
        general_purpose::URL_SAFE_NO_PAD
            .decode(cursor.as_str())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| AppError::Validation("Invalid page token".to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let object = StoredObject {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
            created_at: Utc::now(),
        };
        self.objects.write().await.insert(key.to_string(), object);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    async fn list(
        &self,
        cursor: Option<PageCursor>,
        limit: usize,
    ) -> Result<ObjectPage, AppError> {
        let start = match cursor.as_ref() {
            Some(cursor) => Bound::Excluded(Self::decode_cursor(cursor)?),
            None => Bound::Unbounded,
        };

        let objects = self.objects.read().await;
        let mut window: Vec<ObjectEntry> = objects
            .range::<String, _>((start, Bound::Unbounded))
            .take(limit.saturating_add(1))
            .map(|(key, object)| ObjectEntry {
                key: key.clone(),
                size: object.data.len() as u64,
                created_at: Some(object.created_at),
            })
            .collect();

        let next_cursor = if window.len() > limit {
            window.truncate(limit);
            window.last().map(|entry| Self::encode_cursor(&entry.key))
        } else {
            None
        };

        Ok(ObjectPage {
            entries: window,
            next_cursor,
        })
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, AppError> {
        let expires = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("signed URL TTL out of range")))?
            .timestamp();
        let signature = self.signer.sign(key, expires)?;

        Ok(format!(
            "{}?expires={}&signature={}",
            self.public_url(key),
            expires,
            signature
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/media/{}", self.base_url, urlencoding::encode(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn store() -> MemoryObjectStore {
        MemoryObjectStore::new(
            "http://localhost:8080/",
            UrlSigner::new("0123456789abcdef0123456789abcdef"),
        )
    }

    async fn seed(store: &MemoryObjectStore, count: usize) {
        for i in 0..count {
            store
                .put(&format!("photo-{i:02}.jpg"), vec![0xFF, 0xD8], "image/jpeg")
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn twenty_objects_page_as_sixteen_then_four() {
        let store = store();
        seed(&store, 20).await;

        let first = store.list(None, 16).await.unwrap();
        assert_eq!(first.entries.len(), 16);
        let cursor = first.next_cursor.expect("first page must carry a cursor");

        let second = store.list(Some(cursor), 16).await.unwrap();
        assert_eq!(second.entries.len(), 4);
        assert!(second.next_cursor.is_none());

        let keys: HashSet<_> = first
            .entries
            .iter()
            .chain(second.entries.iter())
            .map(|e| e.key.clone())
            .collect();
        assert_eq!(keys.len(), 20);
    }

    #[tokio::test]
    async fn exact_multiple_of_limit_ends_without_cursor() {
        let store = store();
        seed(&store, 8).await;

        let page = store.list(None, 8).await.unwrap();
        assert_eq!(page.entries.len(), 8);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn same_cursor_returns_same_page() {
        let store = store();
        seed(&store, 10).await;

        let cursor = store.list(None, 3).await.unwrap().next_cursor.unwrap();
        let a = store.list(Some(cursor.clone()), 3).await.unwrap();
        let b = store.list(Some(cursor), 3).await.unwrap();
        assert_eq!(a.entries, b.entries);
    }

    #[tokio::test]
    async fn garbage_cursor_is_a_validation_error() {
        let store = store();
        let error = store
            .list(Some(PageCursor::new("%%%")), 5)
            .await
            .expect_err("undecodable cursor must fail");
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn put_overwrites_and_delete_reports_missing() {
        let store = store();
        store.put("a.jpg", vec![1], "image/jpeg").await.unwrap();
        store.put("a.jpg", vec![2, 3], "image/jpeg").await.unwrap();
        assert_eq!(store.get("a.jpg").await.unwrap().data, vec![2, 3]);
        assert_eq!(store.len().await, 1);

        store.delete("a.jpg").await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(store.delete("a.jpg").await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn signed_url_points_at_media_route() {
        let store = store();
        let url = store
            .signed_url("my party.jpg", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8080/media/my%20party.jpg?expires="));
        assert!(url.contains("&signature="));
    }

    #[tokio::test]
    async fn overflowing_ttl_is_an_error() {
        let store = store();
        let error = store
            .signed_url("a.jpg", Duration::from_secs(10_000_000_000_000))
            .await
            .expect_err("expiry past the representable range must fail");
        assert!(matches!(error, AppError::Internal(_)));
    }
}
