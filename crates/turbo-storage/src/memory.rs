//! In-process storage backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::{KvStore, StorageError};

/// In-memory key-value backend (for development/testing).
///
/// Clones share the same underlying map, so a store handed to one consumer
/// can be inspected or reused by another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` and `delete` fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("writes disabled".to_string()));
        }
        Ok(())
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_string())
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self.inner.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut entries = self.inner.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut entries = self.inner.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let entries = self.inner.entries.read().map_err(|_| poisoned())?;
        Ok(entries.contains_key(key))
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.inner.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", b"one").await.unwrap();
        store.set("k", b"two").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", b"v").await.unwrap();

        assert!(other.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let store = MemoryStore::new();
        store.set("k", b"v").await.unwrap();
        store.fail_writes(true);

        assert!(matches!(
            store.set("k", b"new").await,
            Err(StorageError::Backend(_))
        ));
        assert!(store.delete("k").await.is_err());
        // Reads keep working and the old value survives
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));

        store.fail_writes(false);
        store.set("k", b"new").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.set("b", b"").await.unwrap();
        store.set("a", b"").await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
    }
}
