//! delivery-catalog: catalog backend of a food-delivery platform
//!
//! Long-running HTTP service that:
//! - Manages stores, products and categories (PostgreSQL)
//! - Keeps per-user favorite stores
//! - Geocodes store addresses via Mapbox, with a built-in fallback table
//! - Normalizes uploaded images and stores them on Cloudinary
//!
//! Identity comes from HS256 bearer tokens issued by the auth service.

mod api;
mod auth;
mod config;
mod db;
mod error;
mod services;
mod state;
mod validation;

use config::Config;
use error::BoxError;
use state::AppState;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "delivery_catalog=info,tower_http=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env()?;
    tracing::info!("Starting delivery-catalog (env: {})", config.environment);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let state = AppState::new(config).await?;
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("delivery-catalog HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
