//! Storage collaborator contracts and the in-memory backend

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Logical blob collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    /// Raw image bytes and the photo tray
    Images,
    /// JSON spread records keyed `spread_<index>`
    Spreads,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Images => "images",
            Collection::Spreads => "spreads",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Persistent binary blob storage
pub trait BlobStore {
    fn put(
        &self,
        collection: Collection,
        key: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Ok(None) when no blob is stored under `key`
    fn get(
        &self,
        collection: Collection,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Deleting a missing key succeeds
    fn delete(&self, collection: Collection, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Lightweight persisted string state (metadata index, preferences)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn set_item(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;

    fn remove_item(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Everything the spread store needs from its backend
pub trait Storage: BlobStore + KeyValueStore + Clone + Send + Sync + 'static {}

impl<T> Storage for T where T: BlobStore + KeyValueStore + Clone + Send + Sync + 'static {}

#[derive(Default)]
struct MemoryInner {
    blobs: HashMap<(Collection, String), Vec<u8>>,
    items: HashMap<String, String>,
    quotas: HashMap<Collection, usize>,
    failing_keys: HashSet<String>,
}

impl MemoryInner {
    fn collection_usage(&self, collection: Collection, except: &str) -> usize {
        self.blobs
            .iter()
            .filter(|((c, k), _)| *c == collection && k != except)
            .map(|(_, v)| v.len())
            .sum()
    }
}

/// In-memory backend; clones share the same data.
///
/// Quotas and failing keys let tests simulate a full or flaky store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of a collection in bytes (None lifts the limit)
    pub fn set_quota(&self, collection: Collection, bytes: Option<usize>) {
        let mut inner = self.lock();
        match bytes {
            Some(bytes) => {
                inner.quotas.insert(collection, bytes);
            }
            None => {
                inner.quotas.remove(&collection);
            }
        }
    }

    /// Make every write to `key` fail
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        self.lock().failing_keys.insert(key.into());
    }

    pub fn clear_failures(&self) {
        self.lock().failing_keys.clear();
    }

    pub fn contains(&self, collection: Collection, key: &str) -> bool {
        self.lock()
            .blobs
            .contains_key(&(collection, key.to_string()))
    }

    /// Keys stored in a collection, sorted
    pub fn keys(&self, collection: Collection) -> Vec<String> {
        let inner = self.lock();
        let mut keys: Vec<String> = inner
            .blobs
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A poisoned lock only means a test panicked mid-write; the maps are still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BlobStore for MemoryStore {
    async fn put(&self, collection: Collection, key: &str, value: Vec<u8>) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing_keys.contains(key) {
            return Err(LayoutError::Storage(format!("write to {key} rejected")));
        }
        if let Some(&quota) = inner.quotas.get(&collection) {
            if inner.collection_usage(collection, key) + value.len() > quota {
                return Err(LayoutError::QuotaExceeded {
                    collection: collection.to_string(),
                    key: key.to_string(),
                });
            }
        }
        inner.blobs.insert((collection, key.to_string()), value);
        Ok(())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().blobs.get(&(collection, key.to_string())).cloned())
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        self.lock().blobs.remove(&(collection, key.to_string()));
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing_keys.contains(key) {
            return Err(LayoutError::Storage(format!("write to {key} rejected")));
        }
        inner.items.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.lock().items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = MemoryStore::new();
        store.put(Collection::Spreads, "spread_1", b"{}".to_vec()).await.unwrap();
        assert_eq!(
            store.get(Collection::Spreads, "spread_1").await.unwrap(),
            Some(b"{}".to_vec())
        );
        assert_eq!(store.get(Collection::Images, "spread_1").await.unwrap(), None);
        store.delete(Collection::Spreads, "spread_1").await.unwrap();
        assert!(!store.contains(Collection::Spreads, "spread_1"));
    }

    #[tokio::test]
    async fn test_quota_applies_per_collection() {
        let store = MemoryStore::new();
        store.set_quota(Collection::Images, Some(4));
        store.put(Collection::Images, "a", vec![0; 4]).await.unwrap();
        // Overwriting the same key does not count its old size
        store.put(Collection::Images, "a", vec![0; 3]).await.unwrap();
        let err = store.put(Collection::Images, "b", vec![0; 2]).await.unwrap_err();
        assert!(err.is_quota_exceeded());
        store.put(Collection::Spreads, "b", vec![0; 100]).await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_keys() {
        let store = MemoryStore::new();
        store.fail_writes_to("spread_2");
        assert!(store.put(Collection::Spreads, "spread_2", vec![1]).await.is_err());
        store.clear_failures();
        assert!(store.put(Collection::Spreads, "spread_2", vec![1]).await.is_ok());
    }
}
