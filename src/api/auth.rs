//! Request-scoped identity and city extraction.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use super::AppState;
use crate::domain::UserId;
use crate::CartError;

pub const CITY_HEADER: &str = "x-city";

/// The caller's identity when an `Authorization` header is sent.
///
/// A missing header means an anonymous caller. A header that does not
/// resolve to a user is rejected rather than treated as anonymous.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<UserId>);

/// Like [`MaybeUser`], but the request must be authenticated.
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub UserId);

/// City the request is made from, used to scope address search.
#[derive(Debug, Clone)]
pub struct City(pub String);

fn bearer(parts: &Parts) -> Result<Option<&str>, CartError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else { return Ok(None) };
    let value = value.to_str().map_err(|_| CartError::Unauthorized)?;
    value.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty()).map(Some).ok_or(CartError::Unauthorized)
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = CartError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer(parts)? else { return Ok(Self(None)) };
        match state.identity.user_for_token(token).await {
            Ok(Some(user)) => Ok(Self(Some(user))),
            Ok(None) => Err(CartError::Unauthorized),
            Err(e) => {
                warn!(error = %e, "identity lookup failed");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = CartError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        MaybeUser::from_request_parts(parts, state).await?.0.map(Self).ok_or(CartError::Unauthorized)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for City {
    type Rejection = CartError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let slug = parts.headers.get(CITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| state.default_city.clone(), str::to_lowercase);
        Ok(Self(slug))
    }
}
