//! Cart error types.

use thiserror::Error;
use turbo_storage::StorageError;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// Writing the cart to its storage slot failed.
    ///
    /// The in-memory cart already reflects the mutation when this is returned.
    #[error("Failed to persist cart: {0}")]
    Persistence(#[from] StorageError),

    /// A candidate item cannot be stored in the cart.
    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },

    /// A list of items violates the cart invariants.
    #[error("Invalid cart: {0}")]
    InvalidCart(String),
}
