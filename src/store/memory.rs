//! In-memory cart storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{CartItemStore, CartStore};
use crate::domain::{Cart, CartChanges, CartItem, CartToken, NewCart, Quantity, UserId};
use crate::{CartError, Result};

#[derive(Default)]
struct State {
    carts: Vec<Cart>,
    items: Vec<CartItem>,
    next_cart_id: i64,
    next_item_id: i64,
}

impl State {
    fn cart_mut(&mut self, token: &CartToken) -> Result<&mut Cart> {
        self.carts.iter_mut().find(|c| c.token == token.as_str()).ok_or(CartError::CartNotFound)
    }
}

/// Keeps carts and items behind one lock, so every operation is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a promo line directly, the way the loyalty service does.
    pub async fn insert_promo_item(&self, cart_id: i64, product_id: i64, quantity: i32, company_id: i64) -> CartItem {
        let mut state = self.state.lock().await;
        state.next_item_id += 1;
        let item = CartItem { id: state.next_item_id, cart_id, product_id, company_id, quantity, is_promo: true, created_at: Utc::now() };
        state.items.push(item.clone());
        item
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_by_token(&self, token: &CartToken) -> Result<Cart> {
        let state = self.state.lock().await;
        state.carts.iter().find(|c| c.token == token.as_str()).cloned().ok_or(CartError::CartNotFound)
    }

    async fn create(&self, cart: NewCart) -> Result<Cart> {
        let mut state = self.state.lock().await;
        state.next_cart_id += 1;
        let cart = Cart::from_new(state.next_cart_id, cart, Utc::now());
        state.carts.push(cart.clone());
        Ok(cart)
    }

    async fn update(&self, token: &CartToken, changes: CartChanges) -> Result<Cart> {
        let mut state = self.state.lock().await;
        let cart = state.cart_mut(token)?;
        cart.apply(changes, Utc::now());
        Ok(cart.clone())
    }

    async fn claim(&self, token: &CartToken, user: UserId) -> Result<bool> {
        let mut state = self.state.lock().await;
        Ok(state.cart_mut(token)?.claim(user, Utc::now()))
    }

    async fn set_delay_time(&self, token: &CartToken, ready_at: DateTime<Utc>) -> Result<Cart> {
        let mut state = self.state.lock().await;
        let cart = state.cart_mut(token)?;
        cart.delay_time = Some(ready_at);
        cart.updated_at = Utc::now();
        Ok(cart.clone())
    }

    async fn latest_token_for_user(&self, user: UserId) -> Result<Option<CartToken>> {
        let state = self.state.lock().await;
        Ok(state.carts.iter()
            .filter(|c| c.user_id == Some(user.0))
            .max_by_key(|c| (c.updated_at, c.id))
            .map(Cart::token))
    }
}

#[async_trait]
impl CartItemStore for MemoryStore {
    async fn upsert_by_product(&self, cart_id: i64, product_id: i64, delta: i32, company_id: i64) -> Result<CartItem> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.items.iter_mut().find(|i| i.is_regular_line_for(cart_id, product_id)) {
            existing.quantity = Quantity::new(existing.quantity)?.merge(delta)?.value();
            existing.company_id = company_id;
            return Ok(existing.clone());
        }
        let quantity = Quantity::new(delta)?;
        state.next_item_id += 1;
        let item = CartItem {
            id: state.next_item_id, cart_id, product_id, company_id,
            quantity: quantity.value(), is_promo: false, created_at: Utc::now(),
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update_quantity(&self, cart_id: i64, item_id: i64, quantity: i32) -> Result<CartItem> {
        let quantity = Quantity::new(quantity)?;
        let mut state = self.state.lock().await;
        let item = state.items.iter_mut()
            .find(|i| i.id == item_id && i.cart_id == cart_id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity.value();
        Ok(item.clone())
    }

    async fn delete_item(&self, cart_id: i64, item_id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state.items.retain(|i| !(i.id == item_id && i.cart_id == cart_id));
        if state.items.len() == before { return Err(CartError::ItemNotFound); }
        Ok(())
    }

    async fn delete_all(&self, cart_id: i64) -> Result<u64> {
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state.items.retain(|i| i.cart_id != cart_id);
        Ok((before - state.items.len()) as u64)
    }

    async fn delete_promo_items(&self, cart_id: i64) -> Result<u64> {
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state.items.retain(|i| !(i.cart_id == cart_id && i.is_promo));
        Ok((before - state.items.len()) as u64)
    }

    async fn list_by_cart(&self, cart_id: i64) -> Result<Vec<CartItem>> {
        let state = self.state.lock().await;
        Ok(state.items.iter().filter(|i| i.cart_id == cart_id).cloned().collect())
    }
}
