//! Device-local key-value storage for TurboCommerce clients.
//!
//! Provides an async [`KvStore`] seam with two backends and a typed
//! [`Storage`] wrapper that handles JSON serialization.
//!
//! - [`MemoryStore`] - in-process map, shared between clones
//! - [`FileStore`] - one file per key under a root directory
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_storage::{FileStore, Storage};
//!
//! let storage = Storage::new(FileStore::open("/var/lib/shop").await?);
//!
//! // Store a value
//! storage.set("@shop:cart", &items).await?;
//!
//! // Retrieve a value
//! let items: Option<Vec<CartItem>> = storage.get("@shop:cart").await?;
//!
//! // Delete a value
//! storage.delete("@shop:cart").await?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use kv::{KvStore, Storage};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FileStore, KvStore, MemoryStore, Storage, StorageError};
}
