//! Service configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Catalog service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC key used to verify bearer tokens
    pub jwt_secret: String,
    /// Keep client-supplied `X-User-*` headers when no valid token is present
    pub trust_identity_headers: bool,
    /// Mapbox access token (empty = fallback-only geocoding)
    pub mapbox_access_token: String,
    pub mapbox_base_url: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    /// Per-file upload limit in bytes
    pub max_file_size: usize,
    /// Whole request body limit in bytes
    pub max_request_size: usize,
    /// PostgreSQL pool size
    pub db_max_connections: u32,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let mb = 1024 * 1024;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parse_or("HTTP_PORT", 8080),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            trust_identity_headers: Self::parse_or("TRUST_IDENTITY_HEADERS", false),
            mapbox_access_token: std::env::var("MAPBOX_ACCESS_TOKEN")
                .unwrap_or_default()
                .trim()
                .to_string(),
            mapbox_base_url: std::env::var("MAPBOX_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_MAPBOX_BASE_URL.into()),
            cloudinary_cloud_name: Self::require_secret("CLOUDINARY_CLOUD_NAME", &environment)?,
            cloudinary_api_key: Self::require_secret("CLOUDINARY_API_KEY", &environment)?,
            cloudinary_api_secret: Self::require_secret("CLOUDINARY_API_SECRET", &environment)?,
            max_file_size: Self::parse_or("MAX_FILE_SIZE_MB", 10usize) * mb,
            max_request_size: Self::parse_or("MAX_REQUEST_SIZE_MB", 15usize) * mb,
            db_max_connections: Self::parse_or("DB_MAX_CONNECTIONS", 10),
        })
    }

    /// Configuration for tests and tooling that never touch the database
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/catalog_test".into(),
            http_port: 0,
            environment: "development".into(),
            jwt_secret: "test-secret".into(),
            trust_identity_headers: false,
            mapbox_access_token: String::new(),
            mapbox_base_url: DEFAULT_MAPBOX_BASE_URL.into(),
            cloudinary_cloud_name: "demo".into(),
            cloudinary_api_key: "key".into(),
            cloudinary_api_secret: "secret".into(),
            max_file_size: 10 * 1024 * 1024,
            max_request_size: 15 * 1024 * 1024,
            db_max_connections: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_placeholder_in_development() {
        let val = Config::require_secret("CATALOG_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-CATALOG_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_rejects_missing_in_production() {
        let err = Config::require_secret("CATALOG_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(err.to_string().contains("must be set"));
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(Config::parse_or("CATALOG_TEST_UNSET_PORT", 8080u16), 8080);
    }
}
