//! Postgres cart storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{CartItemStore, CartStore};
use crate::domain::{Cart, CartChanges, CartItem, CartToken, NewCart, Quantity, UserId};
use crate::{CartError, Result};

/// SQLSTATE raised when a merged quantity leaves the INTEGER range.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

fn merge_error(e: sqlx::Error) -> CartError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) => CartError::InvalidQuantity,
        _ => CartError::Database(e),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_by_token(&self, token: &CartToken) -> Result<Cart> {
        sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE token = $1")
            .bind(token.as_str()).fetch_optional(&self.pool).await?
            .ok_or(CartError::CartNotFound)
    }

    async fn create(&self, cart: NewCart) -> Result<Cart> {
        let token = cart.token.unwrap_or_else(CartToken::generate);
        let a = cart.delivery_address;
        let created = sqlx::query_as::<_, Cart>("INSERT INTO carts (token, user_id, company_id, delivery_type, address, home_number, building, entrance, intercom, floor, apartment, comment, delivery_address_classified, address_id, promo_code) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *")
            .bind(token.as_str()).bind(cart.user_id.map(|u| u.0)).bind(cart.company_id).bind(cart.delivery_type.code())
            .bind(&a.address).bind(&a.home_number).bind(&a.building).bind(a.entrance).bind(a.intercom).bind(a.floor).bind(a.apartment).bind(&a.comment)
            .bind(&cart.delivery_address_classified).bind(cart.address_id).bind(&cart.promo_code)
            .fetch_one(&self.pool).await?;
        Ok(created)
    }

    async fn update(&self, token: &CartToken, changes: CartChanges) -> Result<Cart> {
        let a = changes.delivery_address;
        sqlx::query_as::<_, Cart>("UPDATE carts SET company_id = $2, delivery_type = $3, address = $4, home_number = $5, building = $6, entrance = $7, intercom = $8, floor = $9, apartment = $10, comment = $11, delivery_address_classified = $12, address_id = $13, promo_code = $14, updated_at = NOW() WHERE token = $1 RETURNING *")
            .bind(token.as_str()).bind(changes.company_id).bind(changes.delivery_type.code())
            .bind(&a.address).bind(&a.home_number).bind(&a.building).bind(a.entrance).bind(a.intercom).bind(a.floor).bind(a.apartment).bind(&a.comment)
            .bind(&changes.delivery_address_classified).bind(changes.address_id).bind(&changes.promo_code)
            .fetch_optional(&self.pool).await?
            .ok_or(CartError::CartNotFound)
    }

    async fn claim(&self, token: &CartToken, user: UserId) -> Result<bool> {
        let claimed = sqlx::query("UPDATE carts SET user_id = $2, updated_at = NOW() WHERE token = $1 AND user_id IS NULL")
            .bind(token.as_str()).bind(user.0).execute(&self.pool).await?.rows_affected();
        if claimed == 0 {
            // Either owned already or missing; only the latter is an error.
            self.find_by_token(token).await?;
        }
        Ok(claimed > 0)
    }

    async fn set_delay_time(&self, token: &CartToken, ready_at: DateTime<Utc>) -> Result<Cart> {
        sqlx::query_as::<_, Cart>("UPDATE carts SET delay_time = $2, updated_at = NOW() WHERE token = $1 RETURNING *")
            .bind(token.as_str()).bind(ready_at).fetch_optional(&self.pool).await?
            .ok_or(CartError::CartNotFound)
    }

    async fn latest_token_for_user(&self, user: UserId) -> Result<Option<CartToken>> {
        let token: Option<String> = sqlx::query_scalar("SELECT token FROM carts WHERE user_id = $1 ORDER BY updated_at DESC, id DESC LIMIT 1")
            .bind(user.0).fetch_optional(&self.pool).await?;
        Ok(token.map(CartToken::new))
    }
}

#[async_trait]
impl CartItemStore for PgStore {
    async fn upsert_by_product(&self, cart_id: i64, product_id: i64, delta: i32, company_id: i64) -> Result<CartItem> {
        // The conflicting row stays locked until commit, so concurrent adds serialize.
        let mut tx = self.pool.begin().await?;
        let item = sqlx::query_as::<_, CartItem>("INSERT INTO cart_items (cart_id, product_id, company_id, quantity, is_promo) VALUES ($1, $2, $3, $4, FALSE) ON CONFLICT (cart_id, product_id) WHERE is_promo = FALSE DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, company_id = EXCLUDED.company_id RETURNING *")
            .bind(cart_id).bind(product_id).bind(company_id).bind(delta)
            .fetch_one(&mut *tx).await.map_err(merge_error)?;
        if item.quantity <= 0 {
            tx.rollback().await?;
            return Err(CartError::InvalidQuantity);
        }
        tx.commit().await?;
        Ok(item)
    }

    async fn update_quantity(&self, cart_id: i64, item_id: i64, quantity: i32) -> Result<CartItem> {
        let quantity = Quantity::new(quantity)?;
        sqlx::query_as::<_, CartItem>("UPDATE cart_items SET quantity = $3 WHERE id = $2 AND cart_id = $1 RETURNING *")
            .bind(cart_id).bind(item_id).bind(quantity.value()).fetch_optional(&self.pool).await?
            .ok_or(CartError::ItemNotFound)
    }

    async fn delete_item(&self, cart_id: i64, item_id: i64) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM cart_items WHERE id = $2 AND cart_id = $1")
            .bind(cart_id).bind(item_id).execute(&self.pool).await?.rows_affected();
        if deleted == 0 { return Err(CartError::ItemNotFound); }
        Ok(())
    }

    async fn delete_all(&self, cart_id: i64) -> Result<u64> {
        Ok(sqlx::query("DELETE FROM cart_items WHERE cart_id = $1").bind(cart_id).execute(&self.pool).await?.rows_affected())
    }

    async fn delete_promo_items(&self, cart_id: i64) -> Result<u64> {
        Ok(sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND is_promo = TRUE").bind(cart_id).execute(&self.pool).await?.rows_affected())
    }

    async fn list_by_cart(&self, cart_id: i64) -> Result<Vec<CartItem>> {
        Ok(sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY id").bind(cart_id).fetch_all(&self.pool).await?)
    }
}
