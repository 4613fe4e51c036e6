//! Cart Service
//!
//! Shopping cart backend for a multi-company storefront.
//!
//! ## Features
//! - Anonymous and user-owned carts addressed by an opaque token
//! - Line items with quantity merging per product
//! - Promo codes validated and applied through the loyalty service
//! - Delivery address classification through the geocoding service
//! - Delivery cost and ready-time enrichment on read

use thiserror::Error;

pub mod api;
pub mod clients;
pub mod config;
pub mod domain;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Cart not found")]
    CartNotFound,

    #[error("Cart item not found")]
    ItemNotFound,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthenticated")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{service} service failed: {message}")]
    Collaborator { service: &'static str, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, CartError>;
