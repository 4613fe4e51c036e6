//! Stub collaborators for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::clients::{
    AddressCandidate, CityDirectory, CollaboratorError, DelayClient, DelayEstimate, DeliveryQuote,
    GeocodingClient, LoyaltyClient, PricingClient, PromoApplication, SuggestQuery,
};
use crate::domain::CartToken;

fn unavailable(service: &'static str) -> CollaboratorError {
    CollaboratorError::Status { service, status: 503 }
}

#[derive(Default)]
pub struct StubGeocoder {
    pub candidates: Vec<AddressCandidate>,
    pub fail: bool,
    pub queries: Mutex<Vec<SuggestQuery>>,
}

impl StubGeocoder {
    pub fn returning(region_code: Option<&str>, city_region_code: Option<&str>) -> Self {
        Self {
            candidates: vec![AddressCandidate { region_code: region_code.map(Into::into), city_region_code: city_region_code.map(Into::into) }],
            ..Default::default()
        }
    }
}

#[async_trait]
impl GeocodingClient for StubGeocoder {
    async fn suggest(&self, query: &SuggestQuery) -> Result<Vec<AddressCandidate>, CollaboratorError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail { return Err(unavailable("geocoder")); }
        Ok(self.candidates.clone())
    }
}

pub struct FixedRadius(pub u32);

impl CityDirectory for FixedRadius {
    fn radius_for_city(&self, _slug: &str) -> u32 { self.0 }
}

#[derive(Default)]
pub struct StubPricing {
    pub fail: bool,
}

#[async_trait]
impl PricingClient for StubPricing {
    async fn quote(&self, _token: &CartToken) -> Result<DeliveryQuote, CollaboratorError> {
        if self.fail { return Err(unavailable("pricing")); }
        Ok(DeliveryQuote { delivery_cost: Decimal::new(150, 0), diff_cost: Decimal::ZERO, exclude_delivery: false })
    }
}

/// Loyalty stub: codes listed in `valid` pass search; `apply_error` is returned by apply.
#[derive(Default)]
pub struct StubLoyalty {
    pub valid: Vec<String>,
    pub apply_error: Option<String>,
    pub fail_search: bool,
    pub fail_apply: bool,
    pub searches: AtomicUsize,
    pub applications: Mutex<Vec<PromoApplication>>,
}

impl StubLoyalty {
    pub fn accepting(codes: &[&str]) -> Self {
        Self { valid: codes.iter().map(|c| c.to_string()).collect(), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst) + self.applications.lock().unwrap().len()
    }
}

#[async_trait]
impl LoyaltyClient for StubLoyalty {
    async fn search(&self, _company_id: i64, promo_code: &str) -> Result<Option<String>, CollaboratorError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail_search { return Err(unavailable("loyalty")); }
        if self.valid.iter().any(|c| c == promo_code) { Ok(None) } else { Ok(Some("Promo code not found".into())) }
    }

    async fn apply_to_cart(&self, application: &PromoApplication) -> Result<Option<String>, CollaboratorError> {
        self.applications.lock().unwrap().push(application.clone());
        if self.fail_apply { return Err(unavailable("loyalty")); }
        Ok(self.apply_error.clone())
    }
}

pub struct StubDelay {
    pub estimate: Option<DelayEstimate>,
}

impl StubDelay {
    pub fn at(delay_time: DateTime<Utc>, zone_time: i32) -> Self {
        Self { estimate: Some(DelayEstimate { delay_time, zone_time }) }
    }
}

#[async_trait]
impl DelayClient for StubDelay {
    async fn estimate(&self, _token: &CartToken) -> Result<DelayEstimate, CollaboratorError> {
        self.estimate.clone().ok_or_else(|| unavailable("delay"))
    }
}
