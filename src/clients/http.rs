//! `reqwest` implementations of the collaborator traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    AddressCandidate, CollaboratorError, DelayClient, DelayEstimate, DeliveryQuote, GeocodingClient,
    IdentityProvider, LoyaltyClient, PricingClient, PromoApplication, SuggestQuery,
};
use crate::domain::{CartToken, UserId};

/// Base URL and client for one JSON service.
#[derive(Clone, Debug)]
struct JsonService {
    client: Client,
    base_url: String,
    service: &'static str,
}

impl JsonService {
    fn new(client: Client, base_url: &str, service: &'static str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string(), service }
    }

    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CollaboratorError> {
        let http = |source| CollaboratorError::Http { service: self.service, source };
        let response = request.send().await.map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status { service: self.service, status: status.as_u16() });
        }
        response.json::<T>().await.map_err(http)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CollaboratorError> {
        debug!(service = self.service, path, "GET");
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, CollaboratorError> {
        debug!(service = self.service, path, "POST");
        self.send(self.client.post(self.url(path)).json(body)).await
    }
}

pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

// =============================================================================
// Geocoding
// =============================================================================

#[derive(Deserialize)]
struct Suggestions { suggestions: Vec<AddressCandidate> }

pub struct HttpGeocoder(JsonService);

impl HttpGeocoder {
    pub fn new(client: Client, base_url: &str) -> Self { Self(JsonService::new(client, base_url, "geocoder")) }
}

#[async_trait]
impl GeocodingClient for HttpGeocoder {
    async fn suggest(&self, query: &SuggestQuery) -> Result<Vec<AddressCandidate>, CollaboratorError> {
        let found: Suggestions = self.0.post("/suggest/address", query).await?;
        Ok(found.suggestions)
    }
}

// =============================================================================
// Pricing
// =============================================================================

pub struct HttpPricing(JsonService);

impl HttpPricing {
    pub fn new(client: Client, base_url: &str) -> Self { Self(JsonService::new(client, base_url, "pricing")) }
}

#[async_trait]
impl PricingClient for HttpPricing {
    async fn quote(&self, token: &CartToken) -> Result<DeliveryQuote, CollaboratorError> {
        self.0.get(&format!("/carts/{token}/delivery")).await
    }
}

// =============================================================================
// Loyalty
// =============================================================================

#[derive(Serialize)]
struct PromoSearch<'a> { company_id: i64, promo_code: &'a str }

#[derive(Deserialize)]
struct PromoVerdict { error_message: Option<String> }

pub struct HttpLoyalty(JsonService);

impl HttpLoyalty {
    pub fn new(client: Client, base_url: &str) -> Self { Self(JsonService::new(client, base_url, "loyalty")) }
}

#[async_trait]
impl LoyaltyClient for HttpLoyalty {
    async fn search(&self, company_id: i64, promo_code: &str) -> Result<Option<String>, CollaboratorError> {
        let verdict: PromoVerdict = self.0.post("/promo-codes/search", &PromoSearch { company_id, promo_code }).await?;
        Ok(verdict.error_message)
    }

    async fn apply_to_cart(&self, application: &PromoApplication) -> Result<Option<String>, CollaboratorError> {
        let verdict: PromoVerdict = self.0.post("/carts/apply", application).await?;
        Ok(verdict.error_message)
    }
}

// =============================================================================
// Delay
// =============================================================================

pub struct HttpDelay(JsonService);

impl HttpDelay {
    pub fn new(client: Client, base_url: &str) -> Self { Self(JsonService::new(client, base_url, "delay")) }
}

#[async_trait]
impl DelayClient for HttpDelay {
    async fn estimate(&self, token: &CartToken) -> Result<DelayEstimate, CollaboratorError> {
        self.0.get(&format!("/carts/{token}/delay")).await
    }
}

// =============================================================================
// Identity
// =============================================================================

#[derive(Deserialize)]
struct AuthenticatedUser { id: i64 }

pub struct HttpIdentity(JsonService);

impl HttpIdentity {
    pub fn new(client: Client, base_url: &str) -> Self { Self(JsonService::new(client, base_url, "auth")) }
}

#[async_trait]
impl IdentityProvider for HttpIdentity {
    async fn user_for_token(&self, bearer: &str) -> Result<Option<UserId>, CollaboratorError> {
        let request = self.0.client.get(self.0.url("/user")).bearer_auth(bearer);
        match self.0.send::<AuthenticatedUser>(request).await {
            Ok(user) => Ok(Some(UserId(user.id))),
            Err(CollaboratorError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED.as_u16() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
