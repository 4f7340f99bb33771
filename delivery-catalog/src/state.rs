//! Application state

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::error::BoxError;
use crate::services::{CloudinaryStorage, GeocodingService, ImageConverter, ImageStorage};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Mapbox client, fallback-only when not validated
    pub geocoder: Arc<GeocodingService>,
    /// Image CDN
    pub storage: Arc<dyn ImageStorage>,
    pub converter: ImageConverter,
}

impl AppState {
    /// Connect, migrate and probe external services
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let geocoder = GeocodingService::new(&config.mapbox_access_token, &config.mapbox_base_url)?;
        geocoder.validate().await;

        let storage = CloudinaryStorage::new(
            &config.cloudinary_cloud_name,
            &config.cloudinary_api_key,
            &config.cloudinary_api_secret,
        )?;
        tracing::info!(cloud = %config.cloudinary_cloud_name, "Image storage configured");

        Ok(Self {
            pool,
            config: Arc::new(config),
            geocoder: Arc::new(geocoder),
            storage: Arc::new(storage),
            converter: ImageConverter::default(),
        })
    }

    /// State with a lazy pool, for routes that never reach the database
    #[cfg(test)]
    pub fn for_tests(config: Config) -> Self {
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("valid test database url");
        Self::with_pool(
            config,
            pool,
            Arc::new(crate::services::storage::testing::RecordingStorage::default()),
        )
    }

    /// State over a live pool with a caller-provided image storage
    #[cfg(test)]
    pub fn with_pool(config: Config, pool: PgPool, storage: Arc<dyn ImageStorage>) -> Self {
        let geocoder = GeocodingService::new("", &config.mapbox_base_url).expect("http client");
        Self {
            pool,
            config: Arc::new(config),
            geocoder: Arc::new(geocoder),
            storage,
            converter: ImageConverter::default(),
        }
    }
}
