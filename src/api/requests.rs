//! Request bodies and their validation.

use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::domain::{DeliveryAddress, DeliveryType};
use crate::services::{CartInput, PromoRequest};
use crate::{CartError, Result};

/// Distinguishes a field sent as `null` (`Some(None)`) from a missing one (`None`).
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DeliveryAddressRequest {
    pub address: Option<String>,
    #[serde(rename = "homeNumber")]
    pub home_number: Option<String>,
    pub building: Option<String>,
    #[validate(range(min = 0))]
    pub entrance: Option<i32>,
    #[validate(range(min = 0))]
    pub intercom: Option<i32>,
    #[validate(range(min = 0))]
    pub floor: Option<i32>,
    #[validate(range(min = 0))]
    pub apartment: Option<i32>,
    pub comment: Option<String>,
}

impl From<DeliveryAddressRequest> for DeliveryAddress {
    fn from(r: DeliveryAddressRequest) -> Self {
        Self {
            address: r.address, home_number: r.home_number, building: r.building, entrance: r.entrance,
            intercom: r.intercom, floor: r.floor, apartment: r.apartment, comment: r.comment,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_delivery_address"))]
pub struct CartRequest {
    #[serde(default, deserialize_with = "present")]
    pub promo_code: Option<Option<String>>,
    #[validate(range(min = 1))]
    pub company_id: i64,
    #[validate(range(min = 1))]
    pub address_id: Option<i64>,
    #[validate(range(min = 0, max = 1))]
    pub delivery_type: i16,
    #[validate]
    pub delivery_address: Option<DeliveryAddressRequest>,
}

fn validate_delivery_address(request: &CartRequest) -> std::result::Result<(), ValidationError> {
    let filled = |value: Option<&String>| value.is_some_and(|v| !v.trim().is_empty());
    let address = request.delivery_address.as_ref();
    let has_street = filled(address.and_then(|a| a.address.as_ref())) && filled(address.and_then(|a| a.home_number.as_ref()));
    if request.delivery_type == DeliveryType::Delivery.code() && !has_street {
        return Err(ValidationError::new("delivery_address_required"));
    }
    Ok(())
}

impl CartRequest {
    pub fn into_input(self) -> Result<CartInput> {
        self.validate().map_err(|e| CartError::Validation(e.to_string()))?;
        Ok(CartInput {
            company_id: self.company_id,
            delivery_type: DeliveryType::try_from(self.delivery_type)?,
            delivery_address: self.delivery_address.map(Into::into).unwrap_or_default(),
            address_id: self.address_id,
            promo: PromoRequest::from_field(self.promo_code),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    #[validate(range(min = 1))]
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

pub fn validated<T: Validate>(request: T) -> Result<T> {
    request.validate().map_err(|e| CartError::Validation(e.to_string()))?;
    Ok(request)
}
