//! Cart Service - shopping cart backend

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cart_service::api::{router, AppState};
use cart_service::clients::http::{build_client, HttpDelay, HttpGeocoder, HttpIdentity, HttpLoyalty, HttpPricing};
use cart_service::config::AppConfig;
use cart_service::services::{CartService, Collaborators};
use cart_service::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = AppConfig::from_env()?;
    let db = PgPoolOptions::new().max_connections(config.database_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let urls = &config.collaborators;
    let client = build_client(urls.timeout)?;
    let collaborators = Collaborators {
        geocoder: Arc::new(HttpGeocoder::new(client.clone(), &urls.geocoder_url)),
        cities: Arc::new(config.cities.clone()),
        pricing: Arc::new(HttpPricing::new(client.clone(), &urls.pricing_url)),
        loyalty: Arc::new(HttpLoyalty::new(client.clone(), &urls.loyalty_url)),
        delay: Arc::new(HttpDelay::new(client.clone(), &urls.delay_url)),
    };
    let store = Arc::new(PgStore::new(db));
    let state = AppState {
        service: Arc::new(CartService::new(store.clone(), store, collaborators)),
        identity: Arc::new(HttpIdentity::new(client, &urls.auth_url)),
        default_city: config.default_city.clone(),
    };

    let app = router(state);
    tracing::info!(port = config.port, "cart service listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
