//! Cart domain model
pub mod aggregates;
pub mod value_objects;

pub use aggregates::{Cart, CartChanges, CartItem, NewCart};
pub use value_objects::{CartToken, DeliveryAddress, DeliveryType, Quantity, UserId};
