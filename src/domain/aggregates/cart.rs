//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CartToken, DeliveryAddress, DeliveryType, UserId};

/// A persisted cart row. Pricing and zone time are never stored here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cart {
    pub id: i64,
    pub token: String,
    pub user_id: Option<i64>,
    pub company_id: i64,
    pub delivery_type: i16,
    pub address: Option<String>,
    pub home_number: Option<String>,
    pub building: Option<String>,
    pub entrance: Option<i32>,
    pub intercom: Option<i32>,
    pub floor: Option<i32>,
    pub apartment: Option<i32>,
    pub comment: Option<String>,
    pub delivery_address_classified: Option<String>,
    pub address_id: Option<i64>,
    pub promo_code: Option<String>,
    pub delay_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes of a cart about to be inserted.
#[derive(Clone, Debug, Default)]
pub struct NewCart {
    pub token: Option<CartToken>,
    pub user_id: Option<UserId>,
    pub company_id: i64,
    pub delivery_type: DeliveryType,
    pub delivery_address: DeliveryAddress,
    pub delivery_address_classified: Option<String>,
    pub address_id: Option<i64>,
    pub promo_code: Option<String>,
}

/// Attributes replaced by a cart update. Every field is replaced as a whole,
/// including the promo code.
#[derive(Clone, Debug, Default)]
pub struct CartChanges {
    pub company_id: i64,
    pub delivery_type: DeliveryType,
    pub delivery_address: DeliveryAddress,
    pub delivery_address_classified: Option<String>,
    pub address_id: Option<i64>,
    pub promo_code: Option<String>,
}

impl Cart {
    /// Builds the row for a freshly inserted cart.
    pub fn from_new(id: i64, new: NewCart, now: DateTime<Utc>) -> Self {
        let token = new.token.unwrap_or_else(CartToken::generate);
        let address = new.delivery_address;
        Self {
            id, token: token.as_str().to_string(), user_id: new.user_id.map(|u| u.0),
            company_id: new.company_id, delivery_type: new.delivery_type.code(),
            address: address.address, home_number: address.home_number, building: address.building,
            entrance: address.entrance, intercom: address.intercom, floor: address.floor,
            apartment: address.apartment, comment: address.comment,
            delivery_address_classified: new.delivery_address_classified, address_id: new.address_id,
            promo_code: new.promo_code, delay_time: None, created_at: now, updated_at: now,
        }
    }

    pub fn token(&self) -> CartToken { CartToken::new(self.token.clone()) }
    pub fn owner(&self) -> Option<UserId> { self.user_id.map(UserId) }
    pub fn is_owned(&self) -> bool { self.user_id.is_some() }

    /// Sets the owner unless one is already present. Returns whether it changed.
    pub fn claim(&mut self, user: UserId, now: DateTime<Utc>) -> bool {
        if self.is_owned() { return false; }
        self.user_id = Some(user.0);
        self.updated_at = now;
        true
    }

    pub fn apply(&mut self, changes: CartChanges, now: DateTime<Utc>) {
        let address = changes.delivery_address;
        self.company_id = changes.company_id;
        self.delivery_type = changes.delivery_type.code();
        self.address = address.address;
        self.home_number = address.home_number;
        self.building = address.building;
        self.entrance = address.entrance;
        self.intercom = address.intercom;
        self.floor = address.floor;
        self.apartment = address.apartment;
        self.comment = address.comment;
        self.delivery_address_classified = changes.delivery_address_classified;
        self.address_id = changes.address_id;
        self.promo_code = changes.promo_code;
        self.updated_at = now;
    }
}
