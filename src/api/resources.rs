//! Response bodies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::CartItem;
use crate::services::CartView;

#[derive(Debug, Serialize)]
pub struct CartItemResource {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub is_promo: bool,
}

impl From<CartItem> for CartItemResource {
    fn from(i: CartItem) -> Self {
        Self { id: i.id, cart_id: i.cart_id, product_id: i.product_id, quantity: i.quantity, is_promo: i.is_promo }
    }
}

/// Client-facing cart. Pricing fields are `null` unless the operation priced the cart.
#[derive(Debug, Serialize)]
pub struct CartResource {
    pub promo_code: Option<String>,
    pub cart_id: String,
    pub user_id: Option<i64>,
    pub delivery_type: i16,
    pub address: Option<String>,
    #[serde(rename = "homeNumber")]
    pub home_number: Option<String>,
    pub building: Option<String>,
    pub entrance: Option<i32>,
    pub intercom: Option<i32>,
    pub floor: Option<i32>,
    pub apartment: Option<i32>,
    pub comment: Option<String>,
    pub delivery_address_classified: Option<String>,
    pub company_id: i64,
    pub address_id: Option<i64>,
    #[serde(rename = "deliveryCost")]
    pub delivery_cost: Option<Decimal>,
    #[serde(rename = "diffCost")]
    pub diff_cost: Option<Decimal>,
    #[serde(rename = "excludeDelivery")]
    pub exclude_delivery: Option<bool>,
    #[serde(rename = "delayTime")]
    pub delay_time: Option<DateTime<Utc>>,
    #[serde(rename = "zoneTime")]
    pub zone_time: Option<i32>,
    pub cart_product: Vec<CartItemResource>,
    pub promo_error_message: Option<String>,
}

impl From<CartView> for CartResource {
    fn from(view: CartView) -> Self {
        let c = view.cart;
        let quote = view.quote;
        Self {
            promo_code: c.promo_code, cart_id: c.token, user_id: c.user_id, delivery_type: c.delivery_type,
            address: c.address, home_number: c.home_number, building: c.building, entrance: c.entrance,
            intercom: c.intercom, floor: c.floor, apartment: c.apartment, comment: c.comment,
            delivery_address_classified: c.delivery_address_classified, company_id: c.company_id, address_id: c.address_id,
            delivery_cost: quote.as_ref().map(|q| q.delivery_cost),
            diff_cost: quote.as_ref().map(|q| q.diff_cost),
            exclude_delivery: quote.as_ref().map(|q| q.exclude_delivery),
            delay_time: c.delay_time, zone_time: view.zone_time,
            cart_product: view.items.into_iter().map(Into::into).collect(),
            promo_error_message: view.promo_error_message,
        }
    }
}
