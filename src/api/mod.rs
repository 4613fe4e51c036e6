//! HTTP surface

mod auth;
mod handlers;
mod requests;
mod resources;

pub use auth::{City, MaybeUser, RequireUser, CITY_HEADER};
pub use requests::{AddItemRequest, CartRequest, DeliveryAddressRequest, UpdateItemRequest};
pub use resources::{CartItemResource, CartResource};

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::clients::IdentityProvider;
use crate::services::CartService;
use crate::CartError;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CartService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub default_city: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "cart-service"})) }))
        .route("/api/v1/cart", post(handlers::create_cart))
        .route("/api/v1/cart/:id", get(handlers::auth_cart))
        .route("/api/v1/cart/:id/refresh_delay", get(handlers::refresh_delay))
        .route("/api/v1/carts/:token", get(handlers::show_cart).patch(handlers::update_cart))
        .route("/api/v1/carts/:token/items", post(handlers::add_item).delete(handlers::clear_items))
        .route("/api/v1/carts/:token/items/:item_id", patch(handlers::update_item).delete(handlers::remove_item))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let status = match &self {
            CartError::CartNotFound | CartError::ItemNotFound => StatusCode::NOT_FOUND,
            CartError::InvalidQuantity | CartError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CartError::Unauthorized => StatusCode::UNAUTHORIZED,
            CartError::Forbidden => StatusCode::FORBIDDEN,
            CartError::Collaborator { .. } => StatusCode::BAD_GATEWAY,
            CartError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &self {
            CartError::Database(e) => {
                error!(error = %e, "database failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
