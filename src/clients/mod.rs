//! External collaborators of the cart core.
//!
//! Each service the cart talks to is a narrow trait; `http` holds the
//! `reqwest` implementations wired up in `main`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CartToken, UserId};
use crate::CartError;

pub mod city;
pub mod http;

pub use city::StaticCityDirectory;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("{service} request failed: {source}")]
    Http { service: &'static str, #[source] source: reqwest::Error },

    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },
}

impl CollaboratorError {
    pub fn service(&self) -> &'static str {
        match self { Self::Http { service, .. } | Self::Status { service, .. } => service }
    }
}

impl From<CollaboratorError> for CartError {
    fn from(e: CollaboratorError) -> Self {
        CartError::Collaborator { service: e.service(), message: e.to_string() }
    }
}

// =============================================================================
// Geocoding
// =============================================================================

/// Address suggestion query, bounded from country to street level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SuggestQuery {
    pub query: String,
    pub from_bound: String,
    pub to_bound: String,
    pub radius: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddressCandidate {
    pub region_code: Option<String>,
    pub city_region_code: Option<String>,
}

impl AddressCandidate {
    /// The most specific classifier available for this candidate.
    pub fn classifier(&self) -> Option<&str> {
        self.region_code.as_deref().or(self.city_region_code.as_deref())
    }
}

#[async_trait]
pub trait GeocodingClient: Send + Sync {
    async fn suggest(&self, query: &SuggestQuery) -> Result<Vec<AddressCandidate>, CollaboratorError>;
}

pub trait CityDirectory: Send + Sync {
    /// Search radius in meters for address suggestions within the city.
    fn radius_for_city(&self, slug: &str) -> u32;
}

// =============================================================================
// Pricing
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuote {
    pub delivery_cost: Decimal,
    pub diff_cost: Decimal,
    pub exclude_delivery: bool,
}

#[async_trait]
pub trait PricingClient: Send + Sync {
    async fn quote(&self, token: &CartToken) -> Result<DeliveryQuote, CollaboratorError>;
}

// =============================================================================
// Loyalty
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromoLine {
    pub product_id: i64,
    pub quantity: i32,
    pub is_promo: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromoApplication {
    pub cart_id: i64,
    pub company_id: i64,
    pub promo_code: String,
    pub items: Vec<PromoLine>,
}

/// Loyalty service. Both calls answer with an advisory message when the
/// code is not usable, `None` otherwise.
#[async_trait]
pub trait LoyaltyClient: Send + Sync {
    async fn search(&self, company_id: i64, promo_code: &str) -> Result<Option<String>, CollaboratorError>;

    /// Reprices the cart under the promo. Not idempotent on the loyalty side.
    async fn apply_to_cart(&self, application: &PromoApplication) -> Result<Option<String>, CollaboratorError>;
}

// =============================================================================
// Delay
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayEstimate {
    pub delay_time: DateTime<Utc>,
    pub zone_time: i32,
}

#[async_trait]
pub trait DelayClient: Send + Sync {
    async fn estimate(&self, token: &CartToken) -> Result<DelayEstimate, CollaboratorError>;
}

// =============================================================================
// Identity
// =============================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token; `None` when the token is not valid.
    async fn user_for_token(&self, bearer: &str) -> Result<Option<UserId>, CollaboratorError>;
}
