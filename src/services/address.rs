//! Delivery address classification.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::{CityDirectory, GeocodingClient, SuggestQuery};
use crate::domain::DeliveryAddress;

const FROM_BOUND: &str = "country";
const TO_BOUND: &str = "street";

/// Resolves a delivery address into its administrative-region classifier.
///
/// Resolution is best effort: an address the geocoder cannot place, or a
/// geocoder outage, yields `None` and never blocks a cart write.
pub struct AddressResolver {
    geocoder: Arc<dyn GeocodingClient>,
    cities: Arc<dyn CityDirectory>,
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn GeocodingClient>, cities: Arc<dyn CityDirectory>) -> Self {
        Self { geocoder, cities }
    }

    pub fn build_query(address: &DeliveryAddress, radius: u32) -> Option<SuggestQuery> {
        let fragments = address.street_fragments();
        if fragments.is_empty() { return None; }
        Some(SuggestQuery {
            query: fragments.join(", "),
            from_bound: FROM_BOUND.to_string(),
            to_bound: TO_BOUND.to_string(),
            radius,
        })
    }

    pub async fn resolve(&self, address: &DeliveryAddress, city_slug: &str) -> Option<String> {
        let query = Self::build_query(address, self.cities.radius_for_city(city_slug))?;
        match self.geocoder.suggest(&query).await {
            Ok(candidates) => {
                let code = candidates.first().and_then(|c| c.classifier()).map(str::to_string);
                debug!(city = city_slug, query = %query.query, ?code, "address classified");
                code
            }
            Err(e) => {
                warn!(city = city_slug, error = %e, "address classification unavailable");
                None
            }
        }
    }
}
