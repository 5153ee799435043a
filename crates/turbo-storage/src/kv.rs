//! Key-value store seam with automatic serialization.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::StorageError;

/// A raw byte-oriented key-value backend.
///
/// Every slot is addressed by a single string key and holds an opaque byte
/// value. Writes overwrite the previous value wholesale.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the slot is empty.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove the slot. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether a slot exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }

    /// List all keys in the store.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Type-safe storage over any [`KvStore`] backend.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
///
/// # Example
///
/// ```rust,ignore
/// let storage = Storage::new(MemoryStore::new());
/// storage.set("cart:items", &items).await?;
/// let items: Option<Vec<CartItem>> = storage.get("cart:items").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Storage<S> {
    backend: S,
}

impl<S: KvStore> Storage<S> {
    /// Wrap a backend.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Borrow the underlying backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Get and decode a value.
    ///
    /// Returns `None` if the key doesn't exist and an error if the stored
    /// bytes are not valid JSON for `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get(key).await? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Encode and store a value, overwriting whatever was there.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(key, &bytes).await
    }

    /// Delete a value.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.backend.delete(key).await
    }

    /// Check if a key exists.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.backend.exists(key).await
    }

    /// Get all keys.
    pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.backend.keys().await
    }
}
