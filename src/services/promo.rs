//! Promo code coordination with the loyalty service.
//!
//! Every cart write that carries a promo code goes through
//! [`PromoCoordinator`], which turns the request into a [`PromoOutcome`].
//! A rejected code is never stored, but its message still reaches the client.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{LoyaltyClient, PromoApplication, PromoLine};
use crate::domain::CartItem;
use crate::store::CartItemStore;
use crate::Result;

const UNVERIFIED_MESSAGE: &str = "Promo code could not be verified, try again later";

/// What the client asked for in the `promo_code` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromoRequest {
    /// Field not sent at all.
    Absent,
    /// Field sent as null or blank.
    Clear,
    Code(String),
}

impl PromoRequest {
    pub fn from_field(field: Option<Option<String>>) -> Self {
        match field {
            None => Self::Absent,
            Some(value) => match value.as_deref().map(str::trim) {
                Some(code) if !code.is_empty() => Self::Code(code.to_string()),
                _ => Self::Clear,
            },
        }
    }
}

/// Result of running a promo request. Only `Accepted` leaves a code on the cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromoOutcome {
    /// No code was sent, so none is stored and nothing was removed.
    Untouched,
    Accepted(String),
    Cleared,
    Rejected(String),
}

impl PromoOutcome {
    pub fn accepted_code(&self) -> Option<&str> {
        match self { Self::Accepted(code) => Some(code), _ => None }
    }

    pub fn message(&self) -> Option<&str> {
        match self { Self::Rejected(message) => Some(message), _ => None }
    }
}

fn advisory(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

pub struct PromoCoordinator {
    loyalty: Arc<dyn LoyaltyClient>,
    items: Arc<dyn CartItemStore>,
}

impl PromoCoordinator {
    pub fn new(loyalty: Arc<dyn LoyaltyClient>, items: Arc<dyn CartItemStore>) -> Self {
        Self { loyalty, items }
    }

    /// Checks the code against the company. A loyalty outage counts as a
    /// rejection so an unverified code is never stored.
    pub async fn validate(&self, company_id: i64, promo_code: &str) -> Option<String> {
        match self.loyalty.search(company_id, promo_code).await {
            Ok(message) => advisory(message),
            Err(e) => {
                warn!(company_id, error = %e, "promo code search failed");
                Some(UNVERIFIED_MESSAGE.to_string())
            }
        }
    }

    /// Applies the code to the current items. Called at most once per write.
    pub async fn apply(&self, cart_id: i64, company_id: i64, promo_code: &str, items: &[CartItem]) -> Result<Option<String>> {
        let application = PromoApplication {
            cart_id,
            company_id,
            promo_code: promo_code.to_string(),
            items: items.iter().map(|i| PromoLine { product_id: i.product_id, quantity: i.quantity, is_promo: i.is_promo }).collect(),
        };
        Ok(advisory(self.loyalty.apply_to_cart(&application).await?))
    }

    pub async fn remove(&self, cart_id: i64) -> Result<u64> {
        let removed = self.items.delete_promo_items(cart_id).await?;
        info!(cart_id, removed, "promo items removed");
        Ok(removed)
    }

    /// Create-time semantics: validate only, the cart has no items to apply to yet.
    pub async fn on_create(&self, company_id: i64, request: &PromoRequest) -> PromoOutcome {
        match request {
            PromoRequest::Absent | PromoRequest::Clear => PromoOutcome::Untouched,
            PromoRequest::Code(code) => match self.validate(company_id, code).await {
                Some(message) => PromoOutcome::Rejected(message),
                None => PromoOutcome::Accepted(code.clone()),
            },
        }
    }

    /// Update-time semantics. Validation messages win over apply messages.
    /// An absent field calls nothing and leaves promo items alone, but the
    /// stored code is still dropped since updates replace every field.
    pub async fn on_update(&self, cart_id: i64, company_id: i64, request: &PromoRequest) -> Result<PromoOutcome> {
        match request {
            PromoRequest::Absent => Ok(PromoOutcome::Untouched),
            PromoRequest::Clear => {
                self.remove(cart_id).await?;
                Ok(PromoOutcome::Cleared)
            }
            PromoRequest::Code(code) => {
                if let Some(message) = self.validate(company_id, code).await {
                    return Ok(PromoOutcome::Rejected(message));
                }
                let items = self.items.list_by_cart(cart_id).await?;
                Ok(match self.apply(cart_id, company_id, code, &items).await? {
                    Some(message) => PromoOutcome::Rejected(message),
                    None => PromoOutcome::Accepted(code.clone()),
                })
            }
        }
    }
}
