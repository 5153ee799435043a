//! Cart line item types.

use crate::error::CartError;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A product the customer wants to put in the cart.
///
/// Carries the catalog fields of a [`CartItem`] without a quantity; the cart
/// decides the quantity when the candidate is added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCartItem {
    /// Catalog product ID.
    pub id: ProductId,
    /// Product title (denormalized for display).
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price as shown by the catalog.
    pub price: f64,
}

impl NewCartItem {
    /// Create a new candidate item.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Check that the candidate can be persisted and reloaded unchanged.
    ///
    /// JSON has no representation for NaN or infinity, so such prices are
    /// rejected.
    pub fn validate(&self) -> Result<(), CartError> {
        if !self.price.is_finite() {
            return Err(CartError::InvalidItem {
                id: self.id.to_string(),
                reason: format!("price {} is not a finite number", self.price),
            });
        }
        Ok(())
    }
}

/// A line item in the cart.
///
/// Field order is the persisted order: `id, title, image_url, price, quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Catalog product ID, unique within a cart.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: f64,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Build a line item with quantity 1 from a candidate.
    pub fn from_new(item: NewCartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }

    /// Overwrite the catalog fields with the candidate's values.
    pub(crate) fn refresh_from(&mut self, item: NewCartItem) {
        self.title = item.title;
        self.image_url = item.image_url;
        self.price = item.price;
    }
}

impl From<NewCartItem> for CartItem {
    fn from(item: NewCartItem) -> Self {
        Self::from_new(item)
    }
}
