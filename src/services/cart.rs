//! Cart assembly: the operations behind the cart API.

use std::sync::Arc;

use tracing::{info, warn};

use super::address::AddressResolver;
use super::promo::{PromoCoordinator, PromoOutcome, PromoRequest};
use crate::clients::{CityDirectory, DelayClient, DeliveryQuote, GeocodingClient, LoyaltyClient, PricingClient};
use crate::domain::{Cart, CartChanges, CartItem, CartToken, DeliveryAddress, DeliveryType, NewCart, UserId};
use crate::store::{CartItemStore, CartStore};
use crate::{CartError, Result};

/// Validated attributes of a cart create or update.
#[derive(Clone, Debug)]
pub struct CartInput {
    pub company_id: i64,
    pub delivery_type: DeliveryType,
    pub delivery_address: DeliveryAddress,
    pub address_id: Option<i64>,
    pub promo: PromoRequest,
}

impl CartInput {
    fn ensure_deliverable(&self) -> Result<()> {
        if self.delivery_type.requires_address() && !self.delivery_address.has_street() {
            return Err(CartError::Validation("delivery_address.address and delivery_address.homeNumber are required for delivery".into()));
        }
        Ok(())
    }
}

/// A cart with its items and whatever enrichment the operation attached.
#[derive(Clone, Debug)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartItem>,
    pub quote: Option<DeliveryQuote>,
    pub zone_time: Option<i32>,
    pub promo_error_message: Option<String>,
}

impl CartView {
    fn plain(cart: Cart, items: Vec<CartItem>) -> Self {
        Self { cart, items, quote: None, zone_time: None, promo_error_message: None }
    }
}

/// The collaborating services the cart core calls out to.
pub struct Collaborators {
    pub geocoder: Arc<dyn GeocodingClient>,
    pub cities: Arc<dyn CityDirectory>,
    pub pricing: Arc<dyn PricingClient>,
    pub loyalty: Arc<dyn LoyaltyClient>,
    pub delay: Arc<dyn DelayClient>,
}

pub struct CartService {
    carts: Arc<dyn CartStore>,
    items: Arc<dyn CartItemStore>,
    address: AddressResolver,
    promo: PromoCoordinator,
    pricing: Arc<dyn PricingClient>,
    delay: Arc<dyn DelayClient>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, items: Arc<dyn CartItemStore>, collaborators: Collaborators) -> Self {
        Self {
            address: AddressResolver::new(collaborators.geocoder, collaborators.cities),
            promo: PromoCoordinator::new(collaborators.loyalty, items.clone()),
            pricing: collaborators.pricing,
            delay: collaborators.delay,
            carts,
            items,
        }
    }

    async fn load(&self, cart: Cart) -> Result<CartView> {
        let items = self.items.list_by_cart(cart.id).await?;
        Ok(CartView::plain(cart, items))
    }

    /// Resolves a token without loading items or enrichment.
    pub async fn find(&self, token: &CartToken) -> Result<Cart> {
        self.carts.find_by_token(token).await
    }

    /// The cart with its delivery quote. Pricing is attached here only.
    pub async fn show(&self, token: &CartToken) -> Result<CartView> {
        let mut view = self.load(self.carts.find_by_token(token).await?).await?;
        view.quote = match self.pricing.quote(token).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(cart = %token, error = %e, "delivery quote unavailable");
                None
            }
        };
        Ok(view)
    }

    pub async fn create(&self, input: CartInput, city: &str, user: Option<UserId>) -> Result<CartView> {
        input.ensure_deliverable()?;
        let outcome = self.promo.on_create(input.company_id, &input.promo).await;
        let classified = self.address.resolve(&input.delivery_address, city).await;

        let cart = self.carts.create(NewCart {
            token: None,
            user_id: user,
            company_id: input.company_id,
            delivery_type: input.delivery_type,
            delivery_address: input.delivery_address,
            delivery_address_classified: classified,
            address_id: input.address_id,
            promo_code: outcome.accepted_code().map(str::to_string),
        }).await?;
        info!(cart = %cart.token, company_id = cart.company_id, owned = cart.is_owned(), "cart created");

        let mut view = CartView::plain(cart, Vec::new());
        view.promo_error_message = outcome.message().map(str::to_string);
        Ok(view)
    }

    /// Updates the cart without pricing enrichment; callers needing the
    /// delivery quote follow up with [`CartService::show`].
    pub async fn update(&self, token: &CartToken, input: CartInput, city: &str, user: Option<UserId>) -> Result<CartView> {
        let cart = self.carts.find_by_token(token).await?;
        input.ensure_deliverable()?;

        let outcome = self.promo.on_update(cart.id, input.company_id, &input.promo).await?;
        if let PromoOutcome::Rejected(message) = &outcome {
            info!(cart = %token, message = %message, "promo code dropped");
        }
        let classified = self.address.resolve(&input.delivery_address, city).await;

        // Claim after the collaborator calls so a failed apply leaves the cart anonymous.
        if let (None, Some(user)) = (cart.owner(), user) {
            if self.carts.claim(token, user).await? {
                info!(cart = %token, user = %user, "cart claimed");
            }
        }

        let updated = self.carts.update(token, CartChanges {
            company_id: input.company_id,
            delivery_type: input.delivery_type,
            delivery_address: input.delivery_address,
            delivery_address_classified: classified,
            address_id: input.address_id,
            promo_code: outcome.accepted_code().map(str::to_string),
        }).await?;

        let mut view = self.load(updated).await?;
        view.promo_error_message = outcome.message().map(str::to_string);
        Ok(view)
    }

    /// Fetches a fresh ready-time estimate and stores it on the cart.
    pub async fn refresh_delay(&self, token: &CartToken) -> Result<CartView> {
        self.carts.find_by_token(token).await?;
        let estimate = self.delay.estimate(token).await?;
        let cart = self.carts.set_delay_time(token, estimate.delay_time).await?;
        let mut view = self.load(cart).await?;
        view.zone_time = Some(estimate.zone_time);
        Ok(view)
    }

    pub async fn auth_cart_token(&self, user: UserId) -> Result<Option<CartToken>> {
        self.carts.latest_token_for_user(user).await
    }

    pub async fn add_item(&self, token: &CartToken, product_id: i64, quantity: i32) -> Result<CartView> {
        let cart = self.carts.find_by_token(token).await?;
        self.items.upsert_by_product(cart.id, product_id, quantity, cart.company_id).await?;
        self.load(cart).await
    }

    pub async fn update_item(&self, token: &CartToken, item_id: i64, quantity: i32) -> Result<CartView> {
        let cart = self.carts.find_by_token(token).await?;
        self.items.update_quantity(cart.id, item_id, quantity).await?;
        self.load(cart).await
    }

    pub async fn remove_item(&self, token: &CartToken, item_id: i64) -> Result<CartView> {
        let cart = self.carts.find_by_token(token).await?;
        self.items.delete_item(cart.id, item_id).await?;
        self.load(cart).await
    }

    pub async fn clear_items(&self, token: &CartToken) -> Result<CartView> {
        let cart = self.carts.find_by_token(token).await?;
        let removed = self.items.delete_all(cart.id).await?;
        info!(cart = %token, removed, "cart items cleared");
        self.load(cart).await
    }
}
