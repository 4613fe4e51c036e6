//! Aggregates module
pub mod cart;
pub mod cart_item;

pub use cart::{Cart, CartChanges, NewCart};
pub use cart_item::CartItem;
