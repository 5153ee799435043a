//! Persisted cart store.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use turbo_storage::{KvStore, Storage};

use crate::cart::{Cart, CartChange, NewCartItem};
use crate::error::CartError;
use crate::ids::ProductId;

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@goMarketPlace:product";

/// Immutable view of the cart handed to readers.
pub type CartSnapshot = Arc<Cart>;

/// Owns the cart and keeps its storage slot in sync.
///
/// A store only exists once [`CartStore::load`] has finished, so there is no
/// uninitialized state to guard against. Mutations are serialized: each one
/// holds the store lock until the full list has been written, which keeps the
/// persisted slot equal to the in-memory cart once every call has returned.
///
/// # Example
///
/// ```rust,ignore
/// let store = CartStore::load(FileStore::open(dir).await?, DEFAULT_STORAGE_KEY).await;
/// store.add_to_cart(NewCartItem::new("a", "Shoe", "https://img/a.png", 10.0)).await?;
/// store.increment(&ProductId::new("a")).await?;
/// assert_eq!(store.items().total_quantity(), 2);
/// ```
pub struct CartStore<S> {
    storage: Storage<S>,
    key: String,
    cart: Mutex<Cart>,
    snapshot: watch::Sender<CartSnapshot>,
}

impl<S: KvStore> CartStore<S> {
    /// Load the cart persisted under `key`.
    ///
    /// A missing, unreadable or malformed slot yields an empty cart. The
    /// failure is logged and never returned.
    pub async fn load(backend: S, key: impl Into<String>) -> Self {
        let storage = Storage::new(backend);
        let key = key.into();

        let cart = match storage.get::<Cart>(&key).await {
            Ok(Some(cart)) => {
                info!(key = %key, items = cart.len(), "loaded persisted cart");
                cart
            }
            Ok(None) => {
                debug!(key = %key, "no persisted cart, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!(key = %key, error = %e, "discarding unreadable persisted cart");
                Cart::new()
            }
        };

        let (snapshot, _) = watch::channel(Arc::new(cart.clone()));
        Self {
            storage,
            key,
            cart: Mutex::new(cart),
            snapshot,
        }
    }

    /// Load the cart from the default storage key.
    pub async fn load_default(backend: S) -> Self {
        Self::load(backend, DEFAULT_STORAGE_KEY).await
    }

    /// Current cart contents.
    pub fn items(&self) -> CartSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch the cart; the receiver sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshot.subscribe()
    }

    /// The storage slot this cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Add a product, or one more unit of it if already present.
    ///
    /// An invalid candidate is rejected with [`CartError::InvalidItem`]
    /// before the cart or its storage slot is touched.
    pub async fn add_to_cart(&self, item: NewCartItem) -> Result<CartChange, CartError> {
        let id = item.id.clone();
        self.mutate(&id, |cart| cart.add(item)).await
    }

    /// Add one unit of a product already in the cart.
    pub async fn increment(&self, id: &ProductId) -> Result<CartChange, CartError> {
        self.mutate(id, |cart| Ok(cart.increment(id))).await
    }

    /// Remove one unit of a product, dropping it at zero.
    pub async fn decrement(&self, id: &ProductId) -> Result<CartChange, CartError> {
        self.mutate(id, |cart| Ok(cart.decrement(id))).await
    }

    async fn mutate<F>(&self, id: &ProductId, apply: F) -> Result<CartChange, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<CartChange, CartError>,
    {
        let mut cart = self.cart.lock().await;
        let change = match apply(&mut cart) {
            Ok(change) => change,
            Err(e) => {
                warn!(product_id = %id, error = %e, "rejected cart mutation");
                return Err(e);
            }
        };

        if change.is_change() {
            self.snapshot.send_replace(Arc::new(cart.clone()));
        }
        debug!(product_id = %id, ?change, items = cart.len(), "cart mutated");

        // Written while the lock is held so no later mutation can be overtaken.
        if let Err(e) = self.storage.set(&self.key, &*cart).await {
            warn!(key = %self.key, error = %e, "failed to persist cart");
            return Err(CartError::Persistence(e));
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use turbo_storage::MemoryStore;

    fn shoe() -> NewCartItem {
        NewCartItem::new("a", "Shoe", "u", 10.0)
    }

    fn id(s: &str) -> ProductId {
        ProductId::new(s)
    }

    async fn persisted(store: &MemoryStore) -> Option<Vec<CartItem>> {
        Storage::new(store.clone())
            .get(DEFAULT_STORAGE_KEY)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let store = CartStore::load_default(MemoryStore::new()).await;
        assert!(store.items().is_empty());
        assert_eq!(store.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[tokio::test]
    async fn test_load_malformed_slot_starts_empty() {
        let backend = MemoryStore::new();
        backend.set(DEFAULT_STORAGE_KEY, b"{not json").await.unwrap();

        let store = CartStore::load_default(backend).await;
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn test_load_invalid_items_starts_empty() {
        let backend = MemoryStore::new();
        let json = r#"[{"id":"a","title":"t","image_url":"u","price":1,"quantity":1},
                       {"id":"a","title":"t","image_url":"u","price":1,"quantity":2}]"#;
        backend.set(DEFAULT_STORAGE_KEY, json.as_bytes()).await.unwrap();

        let store = CartStore::load_default(backend).await;
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn test_load_existing_slot() {
        let backend = MemoryStore::new();
        let json = r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":3}]"#;
        backend.set(DEFAULT_STORAGE_KEY, json.as_bytes()).await.unwrap();

        let store = CartStore::load_default(backend).await;
        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items.get(&id("a")).unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn test_every_mutation_persists() {
        let backend = MemoryStore::new();
        let store = CartStore::load_default(backend.clone()).await;

        store.add_to_cart(shoe()).await.unwrap();
        assert_eq!(persisted(&backend).await.unwrap()[0].quantity, 1);

        store.increment(&id("a")).await.unwrap();
        assert_eq!(persisted(&backend).await.unwrap()[0].quantity, 2);

        store.decrement(&id("a")).await.unwrap();
        assert_eq!(persisted(&backend).await.unwrap()[0].quantity, 1);

        store.decrement(&id("a")).await.unwrap();
        assert_eq!(persisted(&backend).await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_noop_still_persists() {
        let backend = MemoryStore::new();
        let store = CartStore::load_default(backend.clone()).await;

        let change = store.increment(&id("missing")).await.unwrap();
        assert_eq!(change, CartChange::Unchanged);
        assert_eq!(persisted(&backend).await, Some(vec![]));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_returned() {
        let backend = MemoryStore::new();
        let store = CartStore::load_default(backend.clone()).await;
        backend.fail_writes(true);

        let result = store.add_to_cart(shoe()).await;
        assert!(matches!(result, Err(CartError::Persistence(_))));
        // In-memory state is still authoritative
        assert_eq!(store.items().len(), 1);
        assert_eq!(persisted(&backend).await, None);

        backend.fail_writes(false);
        store.increment(&id("a")).await.unwrap();
        assert_eq!(persisted(&backend).await.unwrap()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_non_finite_price_rejected_and_cart_reloads() {
        let backend = MemoryStore::new();
        let store = CartStore::load_default(backend.clone()).await;
        store.add_to_cart(shoe()).await.unwrap();
        let mut rx = store.subscribe();

        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = store.add_to_cart(NewCartItem::new("b", "Hat", "h", price)).await;
            assert!(matches!(result, Err(CartError::InvalidItem { .. })));
        }
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.items().len(), 1);

        let reloaded = CartStore::load_default(backend).await;
        assert_eq!(reloaded.items(), store.items());
        assert_eq!(reloaded.items().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_immutable() {
        let store = CartStore::load_default(MemoryStore::new()).await;
        store.add_to_cart(shoe()).await.unwrap();

        let before = store.items();
        store.increment(&id("a")).await.unwrap();

        assert_eq!(before.get(&id("a")).unwrap().quantity, 1);
        assert_eq!(store.items().get(&id("a")).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let store = CartStore::load_default(MemoryStore::new()).await;
        let mut rx = store.subscribe();

        store.add_to_cart(shoe()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.increment(&id("missing")).await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_persist_latest_state() {
        let backend = MemoryStore::new();
        let store = Arc::new(CartStore::load_default(backend.clone()).await);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add_to_cart(shoe()).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.items().total_quantity(), 32);
        let saved = persisted(&backend).await.unwrap();
        assert_eq!(saved.as_slice(), store.items().items());
    }
}
