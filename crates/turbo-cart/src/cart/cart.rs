//! Cart state machine.

use std::collections::HashSet;

use crate::cart::{CartItem, NewCartItem};
use crate::error::CartError;
use crate::ids::ProductId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome of a single cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line item was appended with quantity 1.
    Added,
    /// An existing line item's quantity went up.
    Incremented { quantity: u32 },
    /// An existing line item's quantity went down.
    Decremented { quantity: u32 },
    /// A line item was removed.
    Removed,
    /// No line item matched; the cart is unchanged.
    Unchanged,
}

impl CartChange {
    /// Whether the mutation altered the cart contents.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// An ordered list of line items, unique by product ID.
///
/// Every item has a quantity of at least 1. Serializes as a bare JSON array
/// of items; deserializing rejects lists that break either invariant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from existing items, checking the invariants.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(CartError::InvalidCart(format!(
                    "item {} has quantity 0",
                    item.id
                )));
            }
            if !item.price.is_finite() {
                return Err(CartError::InvalidCart(format!(
                    "item {} has non-finite price",
                    item.id
                )));
            }
            if !seen.insert(&item.id) {
                return Err(CartError::InvalidCart(format!(
                    "duplicate item {}",
                    item.id
                )));
            }
        }
        Ok(Self { items })
    }

    /// Add a product.
    ///
    /// An existing line item with the same ID gets one more unit and takes
    /// the candidate's title, image and price. Otherwise the candidate is
    /// appended with quantity 1. A candidate with a non-finite price is
    /// rejected and leaves the cart unchanged.
    pub fn add(&mut self, candidate: NewCartItem) -> Result<CartChange, CartError> {
        candidate.validate()?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == candidate.id) {
            existing.refresh_from(candidate);
            existing.quantity = existing.quantity.saturating_add(1);
            return Ok(CartChange::Incremented {
                quantity: existing.quantity,
            });
        }

        self.items.push(CartItem::from_new(candidate));
        Ok(CartChange::Added)
    }

    /// Add one unit of an existing line item.
    pub fn increment(&mut self, id: &ProductId) -> CartChange {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Incremented {
                    quantity: item.quantity,
                }
            }
            None => CartChange::Unchanged,
        }
    }

    /// Remove one unit of an existing line item.
    ///
    /// A line item at quantity 1 is removed from the cart.
    pub fn decrement(&mut self, id: &ProductId) -> CartChange {
        let Some(pos) = self.items.iter().position(|i| &i.id == id) else {
            return CartChange::Unchanged;
        };

        let item = &mut self.items[pos];
        if item.quantity > 1 {
            item.quantity -= 1;
            CartChange::Decremented {
                quantity: item.quantity,
            }
        } else {
            self.items.remove(pos);
            CartChange::Removed
        }
    }

    /// The line items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart and return its items.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Iterate over line items.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Get a line item by product ID.
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<CartItem>::deserialize(deserializer)?;
        Self::from_items(items).map_err(serde::de::Error::custom)
    }
}
