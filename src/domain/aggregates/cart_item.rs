//! Cart Item Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub company_id: i64,
    pub quantity: i32,
    pub is_promo: bool,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    /// True when this row is the mergeable (non-promo) line for `product_id`.
    pub fn is_regular_line_for(&self, cart_id: i64, product_id: i64) -> bool {
        self.cart_id == cart_id && self.product_id == product_id && !self.is_promo
    }
}
