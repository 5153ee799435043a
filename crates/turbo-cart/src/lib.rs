//! Persisted shopping-cart state for TurboCommerce clients.
//!
//! This crate keeps a storefront's cart on the device:
//!
//! - **Cart**: ordered line items, unique by product ID, quantity always >= 1
//! - **CartStore**: owns the cart, serializes mutations and writes the whole
//!   list to one storage slot after each of them
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cart::prelude::*;
//! use turbo_storage::FileStore;
//!
//! // Built once by the application and shared by reference
//! let store = CartStore::load_default(FileStore::open(data_dir).await?).await;
//!
//! store.add_to_cart(NewCartItem::new("a", "Shoe", "https://img/a.png", 10.0)).await?;
//! store.increment(&ProductId::new("a")).await?;
//!
//! for item in store.items().iter() {
//!     println!("{} x{}", item.title, item.quantity);
//! }
//! ```

pub mod cart;
pub mod error;
pub mod ids;
pub mod store;

pub use cart::{Cart, CartChange, CartItem, NewCartItem};
pub use error::CartError;
pub use ids::ProductId;
pub use store::{CartSnapshot, CartStore, DEFAULT_STORAGE_KEY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, CartChange, CartItem, NewCartItem};
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::store::{CartSnapshot, CartStore, DEFAULT_STORAGE_KEY};
}
