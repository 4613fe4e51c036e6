//! HTTP tests against the in-memory store with stubbed collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use cart_service::api::{router, AppState};
use cart_service::clients::{
    AddressCandidate, CollaboratorError, DelayClient, DelayEstimate, DeliveryQuote, GeocodingClient,
    IdentityProvider, LoyaltyClient, PricingClient, PromoApplication, StaticCityDirectory, SuggestQuery,
};
use cart_service::domain::{CartToken, UserId};
use cart_service::services::{CartService, Collaborators};
use cart_service::store::MemoryStore;

struct Geocoder;

#[async_trait]
impl GeocodingClient for Geocoder {
    async fn suggest(&self, _query: &SuggestQuery) -> Result<Vec<AddressCandidate>, CollaboratorError> {
        Ok(vec![AddressCandidate { region_code: Some("77-001".into()), city_region_code: None }])
    }
}

struct Pricing;

#[async_trait]
impl PricingClient for Pricing {
    async fn quote(&self, _token: &CartToken) -> Result<DeliveryQuote, CollaboratorError> {
        Ok(DeliveryQuote { delivery_cost: Decimal::new(2500, 2), diff_cost: Decimal::new(500, 2), exclude_delivery: false })
    }
}

struct Loyalty;

#[async_trait]
impl LoyaltyClient for Loyalty {
    async fn search(&self, _company_id: i64, promo_code: &str) -> Result<Option<String>, CollaboratorError> {
        Ok((promo_code != "WELCOME").then(|| "Promo code expired".to_string()))
    }

    async fn apply_to_cart(&self, _application: &PromoApplication) -> Result<Option<String>, CollaboratorError> {
        Ok(None)
    }
}

struct Delay;

#[async_trait]
impl DelayClient for Delay {
    async fn estimate(&self, _token: &CartToken) -> Result<DelayEstimate, CollaboratorError> {
        Ok(DelayEstimate { delay_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(), zone_time: 45 })
    }
}

/// Accepts `Bearer user-<id>`.
struct Identity;

#[async_trait]
impl IdentityProvider for Identity {
    async fn user_for_token(&self, bearer: &str) -> Result<Option<UserId>, CollaboratorError> {
        Ok(bearer.strip_prefix("user-").and_then(|id| id.parse().ok()).map(UserId))
    }
}

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let collaborators = Collaborators {
        geocoder: Arc::new(Geocoder),
        cities: Arc::new(StaticCityDirectory::default()),
        pricing: Arc::new(Pricing),
        loyalty: Arc::new(Loyalty),
        delay: Arc::new(Delay),
    };
    router(AppState {
        service: Arc::new(CartService::new(store.clone(), store, collaborators)),
        identity: Arc::new(Identity),
        default_city: "default".into(),
    })
}

async fn send(app: &Router, method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request.header(header::CONTENT_TYPE, "application/json").body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn delivery_body() -> Value {
    json!({
        "company_id": 3,
        "delivery_type": 0,
        "delivery_address": {"address": "Lenina st", "homeNumber": "10", "floor": 2}
    })
}

async fn create(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/v1/cart", None, Some(delivery_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    body["cart_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_anonymous_cart() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/v1/cart", None, Some(delivery_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cart_id"].as_str().unwrap().len(), 32);
    assert_eq!(body["address"], "Lenina st");
    assert_eq!(body["homeNumber"], "10");
    assert_eq!(body["delivery_address_classified"], "77-001");
    assert_eq!(body["user_id"], Value::Null);
    assert_eq!(body["promo_code"], Value::Null);
    assert_eq!(body["cart_product"], json!([]));
}

#[tokio::test]
async fn test_create_rejects_delivery_without_house_number() {
    let body = json!({"company_id": 3, "delivery_type": 0, "delivery_address": {"address": "Lenina st"}});
    let (status, body) = send(&app(), Method::POST, "/api/v1/cart", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("Validation"));
}

#[tokio::test]
async fn test_show_includes_pricing() {
    let app = app();
    let token = create(&app).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/carts/{token}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deliveryCost"], json!(25.0));
    assert_eq!(body["diffCost"], json!(5.0));
    assert_eq!(body["excludeDelivery"], json!(false));
}

#[tokio::test]
async fn test_unknown_cart_is_404() {
    let (status, body) = send(&app(), Method::GET, "/api/v1/carts/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cart not found");
}

#[tokio::test]
async fn test_update_with_rejected_promo() {
    let app = app();
    let token = create(&app).await;

    let mut body = delivery_body();
    body["promo_code"] = json!("EXPIRED");
    body["delivery_address"]["comment"] = json!("ring twice");
    let (status, body) = send(&app, Method::PATCH, &format!("/api/v1/carts/{token}"), None, Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promo_code"], Value::Null);
    assert_eq!(body["promo_error_message"], "Promo code expired");
    assert_eq!(body["comment"], "ring twice");
    assert_eq!(body["deliveryCost"], Value::Null);
}

#[tokio::test]
async fn test_update_with_accepted_promo() {
    let app = app();
    let token = create(&app).await;

    let mut body = delivery_body();
    body["promo_code"] = json!("WELCOME");
    let (status, body) = send(&app, Method::PATCH, &format!("/api/v1/carts/{token}"), None, Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promo_code"], "WELCOME");
    assert_eq!(body["promo_error_message"], Value::Null);
}

#[tokio::test]
async fn test_update_claims_cart_for_first_user() {
    let app = app();
    let token = create(&app).await;
    let uri = format!("/api/v1/carts/{token}");

    let (_, body) = send(&app, Method::PATCH, &uri, Some("user-7"), Some(delivery_body())).await;
    assert_eq!(body["user_id"], 7);

    let (_, body) = send(&app, Method::PATCH, &uri, Some("user-8"), Some(delivery_body())).await;
    assert_eq!(body["user_id"], 7);

    let (status, body) = send(&app, Method::GET, "/api/v1/cart/7", Some("user-7"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(token));
}

#[tokio::test]
async fn test_invalid_bearer_is_401() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/api/v1/cart", Some("nobody"), Some(delivery_body())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_cart_requires_matching_user() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/v1/cart/7", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/cart/7", Some("user-8"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/api/v1/cart/8", Some("user-8"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_refresh_delay() {
    let app = app();
    let token = create(&app).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/cart/{token}/refresh_delay"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delayTime"], "2024-05-01T12:30:00Z");
    assert_eq!(body["zoneTime"], 45);
}

#[tokio::test]
async fn test_item_lifecycle() {
    let app = app();
    let token = create(&app).await;
    let items = format!("/api/v1/carts/{token}/items");

    send(&app, Method::POST, &items, None, Some(json!({"product_id": 42, "quantity": 1}))).await;
    let (status, body) = send(&app, Method::POST, &items, None, Some(json!({"product_id": 42, "quantity": 2}))).await;
    assert_eq!(status, StatusCode::OK);
    let lines = body["cart_product"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["is_promo"], false);
    let item_id = lines[0]["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::PATCH, &format!("{items}/{item_id}"), None, Some(json!({"quantity": 5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart_product"][0]["quantity"], 5);

    let (status, _) = send(&app, Method::PATCH, &format!("{items}/{item_id}"), None, Some(json!({"quantity": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, Method::DELETE, &format!("{items}/{item_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart_product"], json!([]));

    let (status, _) = send(&app, Method::DELETE, &format!("{items}/{item_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_items_twice() {
    let app = app();
    let token = create(&app).await;
    let items = format!("/api/v1/carts/{token}/items");
    send(&app, Method::POST, &items, None, Some(json!({"product_id": 1, "quantity": 1}))).await;

    for _ in 0..2 {
        let (status, body) = send(&app, Method::DELETE, &items, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cart_product"], json!([]));
    }
}

#[tokio::test]
async fn test_unknown_cart_outranks_invalid_body() {
    let app = app();
    let invalid = json!({"company_id": 0, "delivery_type": 0});
    let (status, _) = send(&app, Method::PATCH, "/api/v1/carts/missing", None, Some(invalid.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/api/v1/carts/missing/items", None, Some(json!({"product_id": 0, "quantity": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PATCH, "/api/v1/carts/missing/items/1", None, Some(json!({"quantity": 0}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let token = create(&app).await;
    let (status, _) = send(&app, Method::PATCH, &format!("/api/v1/carts/{token}"), None, Some(invalid)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_without_promo_field_drops_code() {
    let app = app();
    let uri = format!("/api/v1/carts/{}", create(&app).await);

    let mut body = delivery_body();
    body["promo_code"] = json!("WELCOME");
    let (_, body) = send(&app, Method::PATCH, &uri, None, Some(body)).await;
    assert_eq!(body["promo_code"], "WELCOME");

    let (status, body) = send(&app, Method::PATCH, &uri, None, Some(delivery_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promo_code"], Value::Null);
    assert_eq!(body["promo_error_message"], Value::Null);
}
