use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::auth::{City, MaybeUser, RequireUser};
use super::requests::{validated, AddItemRequest, CartRequest, UpdateItemRequest};
use super::resources::CartResource;
use super::AppState;
use crate::domain::{CartToken, UserId};
use crate::{CartError, Result};

/// An unknown token outranks an invalid body, so a rejected body is only
/// reported once the cart is known to exist.
async fn for_cart<T>(s: &AppState, token: &CartToken, body: Result<T>) -> Result<T> {
    if body.is_err() {
        s.service.find(token).await?;
    }
    body
}

pub async fn create_cart(
    State(s): State<AppState>,
    MaybeUser(user): MaybeUser,
    City(city): City,
    Json(r): Json<CartRequest>,
) -> Result<(StatusCode, Json<CartResource>)> {
    let view = s.service.create(r.into_input()?, &city, user).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

pub async fn show_cart(State(s): State<AppState>, Path(token): Path<CartToken>) -> Result<Json<CartResource>> {
    Ok(Json(s.service.show(&token).await?.into()))
}

pub async fn update_cart(
    State(s): State<AppState>,
    Path(token): Path<CartToken>,
    MaybeUser(user): MaybeUser,
    City(city): City,
    Json(r): Json<CartRequest>,
) -> Result<Json<CartResource>> {
    let input = for_cart(&s, &token, r.into_input()).await?;
    Ok(Json(s.service.update(&token, input, &city, user).await?.into()))
}

pub async fn refresh_delay(State(s): State<AppState>, Path(token): Path<CartToken>) -> Result<Json<CartResource>> {
    Ok(Json(s.service.refresh_delay(&token).await?.into()))
}

/// Token of the newest cart owned by the caller, `null` when there is none.
pub async fn auth_cart(
    State(s): State<AppState>,
    Path(user_id): Path<i64>,
    RequireUser(user): RequireUser,
) -> Result<Json<Option<CartToken>>> {
    if UserId(user_id) != user {
        return Err(CartError::Forbidden);
    }
    Ok(Json(s.service.auth_cart_token(user).await?))
}

pub async fn add_item(
    State(s): State<AppState>,
    Path(token): Path<CartToken>,
    Json(r): Json<AddItemRequest>,
) -> Result<Json<CartResource>> {
    let r = for_cart(&s, &token, validated(r)).await?;
    Ok(Json(s.service.add_item(&token, r.product_id, r.quantity).await?.into()))
}

pub async fn update_item(
    State(s): State<AppState>,
    Path((token, item_id)): Path<(CartToken, i64)>,
    Json(r): Json<UpdateItemRequest>,
) -> Result<Json<CartResource>> {
    let r = for_cart(&s, &token, validated(r)).await?;
    Ok(Json(s.service.update_item(&token, item_id, r.quantity).await?.into()))
}

pub async fn remove_item(
    State(s): State<AppState>,
    Path((token, item_id)): Path<(CartToken, i64)>,
) -> Result<Json<CartResource>> {
    Ok(Json(s.service.remove_item(&token, item_id).await?.into()))
}

pub async fn clear_items(State(s): State<AppState>, Path(token): Path<CartToken>) -> Result<Json<CartResource>> {
    Ok(Json(s.service.clear_items(&token).await?.into()))
}
