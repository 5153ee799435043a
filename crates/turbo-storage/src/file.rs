//! Filesystem storage backend.
//!
//! Each key maps to one file under the store's root directory. Key bytes are
//! lowercase hex-encoded into the file name, so namespaced keys such as
//! `@shop:cart` never escape the root or collide with path syntax, and two
//! keys never share a file on case-insensitive filesystems.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use crate::{KvStore, StorageError};

const SLOT_EXTENSION: &str = "slot";
const TEMP_EXTENSION: &str = "tmp";

/// Longest key in bytes; its hex name plus temp suffix stays within the
/// 255-byte file name limit of common filesystems.
const MAX_KEY_LEN: usize = 100;

/// Device-local key-value backend rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = dir.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::Open(format!("{}: {}", root.display(), e)))?;
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    /// The directory holding the slot files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", encode_key(key), SLOT_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            "{}.{}.{}.{}",
            encode_key(key),
            std::process::id(),
            n,
            TEMP_EXTENSION
        ))
    }
}

fn encode_key(key: &str) -> String {
    hex::encode(key.as_bytes())
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::Backend("storage key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::Backend(format!(
            "storage key is {} bytes, limit is {}",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    Ok(())
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        check_key(key)?;
        match fs::read(self.slot_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        check_key(key)?;
        // Write-then-rename so readers never observe a partial slot.
        let temp = self.temp_path(key);
        if let Err(e) = fs::write(&temp, value).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io(key, e));
        }
        if let Err(e) = fs::rename(&temp, self.slot_path(key)).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io(key, e));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        match fs::remove_file(self.slot_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        check_key(key)?;
        fs::try_exists(self.slot_path(key))
            .await
            .map_err(|e| StorageError::io(key, e))
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let root = self.root.display().to_string();
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::io(root.clone(), e))?;

        let mut keys = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::io(root.clone(), e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXTENSION) {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(decode_key)
            {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
