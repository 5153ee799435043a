//! Storage error types.

use thiserror::Error;

/// Errors that can occur when reading or writing a storage slot.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    Open(String),

    /// Filesystem operation failed.
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend rejected the operation.
    #[error("Store operation failed: {0}")]
    Backend(String),
}

impl StorageError {
    pub(crate) fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }
}
