//! Value Objects for carts

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::CartError;

/// Opaque client-facing cart identifier.
///
/// Generated at random when the cart is created and stored next to the
/// numeric key; it carries no information about the key itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(String);

impl CartToken {
    pub fn generate() -> Self { Self(Uuid::new_v4().simple().to_string()) }
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Authenticated user identity, passed explicitly into cart operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryType {
    #[default]
    Delivery,
    Pickup,
}

impl DeliveryType {
    pub fn code(self) -> i16 {
        match self { Self::Delivery => 0, Self::Pickup => 1 }
    }

    pub fn requires_address(self) -> bool { matches!(self, Self::Delivery) }
}

impl TryFrom<i16> for DeliveryType {
    type Error = CartError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Delivery),
            1 => Ok(Self::Pickup),
            other => Err(CartError::Validation(format!("unknown delivery type {other}"))),
        }
    }
}

/// Free-text delivery address as entered by the customer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub address: Option<String>,
    pub home_number: Option<String>,
    pub building: Option<String>,
    pub entrance: Option<i32>,
    pub intercom: Option<i32>,
    pub floor: Option<i32>,
    pub apartment: Option<i32>,
    pub comment: Option<String>,
}

impl DeliveryAddress {
    /// Street-level fragments usable as a geocoding query, blanks skipped.
    pub fn street_fragments(&self) -> Vec<&str> {
        [&self.address, &self.home_number, &self.building]
            .into_iter()
            .filter_map(|f| f.as_deref().map(str::trim))
            .filter(|f| !f.is_empty())
            .collect()
    }

    pub fn has_street(&self) -> bool {
        let filled = |f: &Option<String>| f.as_deref().is_some_and(|v| !v.trim().is_empty());
        filled(&self.address) && filled(&self.home_number)
    }
}

/// Line item quantity, always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i32) -> Result<Self, CartError> {
        if value <= 0 { return Err(CartError::InvalidQuantity); }
        Ok(Self(value))
    }
    pub fn value(&self) -> i32 { self.0 }

    /// Merges a signed delta into the quantity; the result must stay positive.
    pub fn merge(&self, delta: i32) -> Result<Self, CartError> {
        Self::new(self.0.checked_add(delta).ok_or(CartError::InvalidQuantity)?)
    }
}
