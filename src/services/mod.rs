//! Cart services
pub mod address;
pub mod cart;
pub mod promo;

pub use address::AddressResolver;
pub use cart::{CartInput, CartService, CartView, Collaborators};
pub use promo::{PromoCoordinator, PromoOutcome, PromoRequest};
