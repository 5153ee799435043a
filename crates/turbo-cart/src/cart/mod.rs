//! Shopping cart module.
//!
//! Contains the line item types and the cart state machine.

mod cart;
mod item;

pub use cart::{Cart, CartChange};
pub use item::{CartItem, NewCartItem};
