//! Cart persistence.
//!
//! Two stores back the cart core: one for the cart row, one for its line
//! items. Both are traits so the service can run against Postgres in
//! production and against memory in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Cart, CartChanges, CartItem, CartToken, NewCart, UserId};
use crate::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_by_token(&self, token: &CartToken) -> Result<Cart>;

    /// Inserts a cart. A token is generated unless `cart.token` is set.
    async fn create(&self, cart: NewCart) -> Result<Cart>;

    async fn update(&self, token: &CartToken, changes: CartChanges) -> Result<Cart>;

    /// Attaches an owner to an anonymous cart. Returns `false` when the cart
    /// already had one, which is left untouched.
    async fn claim(&self, token: &CartToken, user: UserId) -> Result<bool>;

    async fn set_delay_time(&self, token: &CartToken, ready_at: DateTime<Utc>) -> Result<Cart>;

    /// Token of the user's most recently touched cart.
    async fn latest_token_for_user(&self, user: UserId) -> Result<Option<CartToken>>;
}

#[async_trait]
pub trait CartItemStore: Send + Sync {
    /// Adds `delta` to the regular line of `product_id`, inserting it when
    /// missing. Fails with `InvalidQuantity` and changes nothing when the
    /// resulting quantity would not be positive.
    async fn upsert_by_product(&self, cart_id: i64, product_id: i64, delta: i32, company_id: i64) -> Result<CartItem>;

    async fn update_quantity(&self, cart_id: i64, item_id: i64, quantity: i32) -> Result<CartItem>;

    async fn delete_item(&self, cart_id: i64, item_id: i64) -> Result<()>;

    async fn delete_all(&self, cart_id: i64) -> Result<u64>;

    async fn delete_promo_items(&self, cart_id: i64) -> Result<u64>;

    /// Items in insertion order.
    async fn list_by_cart(&self, cart_id: i64) -> Result<Vec<CartItem>>;
}
