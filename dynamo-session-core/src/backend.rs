//! Key-value backend abstraction.

use crate::error::BackendResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A session item as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// Partition key
    pub id: String,
    /// Codec payload; `None` when the item has no data attribute
    pub data: Option<String>,
    /// TTL instant, when the item carries one
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    /// Create a stored item.
    pub fn new(id: impl Into<String>, data: Option<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: id.into(),
            data,
            expires_at,
        }
    }

    /// Whether the TTL instant has passed.
    ///
    /// Stores that expire items lazily can return such items for a while
    /// after their TTL; they are treated as gone.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Storage backend for session payloads, addressed by session id.
///
/// Implementations translate these calls into their store's wire protocol
/// and convert every client error into a
/// [`BackendError`](crate::error::BackendError).
///
/// # Examples
///
/// ```
/// use dynamo_session_core::{KeyValueBackend, MemoryBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MemoryBackend::new();
/// let expires_at = chrono::Utc::now() + chrono::Duration::hours(1);
///
/// backend.put("abc", "payload", expires_at).await?;
/// let item = backend.get("abc", true).await?;
/// assert_eq!(item.and_then(|i| i.data).as_deref(), Some("payload"));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Point read.
    ///
    /// Returns `Ok(None)` when no item exists for `id`.
    async fn get(&self, id: &str, consistent_read: bool) -> BackendResult<Option<StoredSession>>;

    /// Point upsert of the payload and its TTL instant.
    async fn put(&self, id: &str, payload: &str, expires_at: DateTime<Utc>) -> BackendResult<()>;

    /// Point delete. Deleting an absent item succeeds.
    async fn delete(&self, id: &str) -> BackendResult<()>;

    /// Short backend name for log fields.
    fn name(&self) -> &'static str {
        "backend"
    }
}

/// Process-local backend.
///
/// Honors TTLs on read but keeps expired items until
/// [`purge_expired`](Self::purge_expired) runs. Only suitable for a single
/// process: development servers and tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<HashMap<String, StoredSession>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items, expired ones included.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the backend holds no items.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Drop expired items, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|_, item| !item.is_expired());
        before - items.len()
    }

    /// Insert an item directly, bypassing the TTL computation of `put`.
    pub async fn insert(&self, item: StoredSession) {
        self.items.write().await.insert(item.id.clone(), item);
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, id: &str, _consistent_read: bool) -> BackendResult<Option<StoredSession>> {
        let items = self.items.read().await;
        Ok(items.get(id).filter(|item| !item.is_expired()).cloned())
    }

    async fn put(&self, id: &str, payload: &str, expires_at: DateTime<Utc>) -> BackendResult<()> {
        let item = StoredSession::new(id, Some(payload.to_string()), Some(expires_at));
        self.items.write().await.insert(id.to_string(), item);
        Ok(())
    }

    async fn delete(&self, id: &str) -> BackendResult<()> {
        self.items.write().await.remove(id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_memory_put_get_delete() {
        let backend = MemoryBackend::new();
        let expires_at = Utc::now() + Duration::hours(1);

        assert!(backend.get("abc", false).await.unwrap().is_none());

        backend.put("abc", "payload", expires_at).await.unwrap();
        let item = backend.get("abc", false).await.unwrap().unwrap();
        assert_eq!(item.id, "abc");
        assert_eq!(item.data.as_deref(), Some("payload"));
        assert_eq!(item.expires_at, Some(expires_at));

        backend.delete("abc").await.unwrap();
        assert!(backend.get("abc", false).await.unwrap().is_none());
        // Deleting again is fine
        backend.delete("abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_hides_expired_items() {
        let backend = MemoryBackend::new();
        backend
            .put("old", "payload", Utc::now() - Duration::seconds(1))
            .await
            .unwrap();
        backend
            .put("live", "payload", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert!(backend.get("old", true).await.unwrap().is_none());
        assert_eq!(backend.len().await, 2);

        assert_eq!(backend.purge_expired().await, 1);
        assert_eq!(backend.len().await, 1);
        assert!(backend.get("live", true).await.unwrap().is_some());
    }

    #[test]
    fn test_stored_session_without_ttl_never_expires() {
        let item = StoredSession::new("abc", None, None);
        assert!(!item.is_expired());
    }
}
