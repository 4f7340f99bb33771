//! Mapbox geocoding client with a static per-city fallback
//!
//! Forward lookups resolve store addresses to coordinates. When the API is
//! not configured, unreachable, or returns nothing, coordinates come from a
//! small table keyed on `city, country`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Address, AddressInput};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const COORDINATE_SCALE: u32 = 8;
const PROBE_ADDRESS: &str = "New York";

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid geocoding URL: {0}")]
    Url(String),
    #[error("no geocoding results for '{0}'")]
    NoResults(String),
    #[error("geocoding API is not configured")]
    NotConfigured,
}

impl From<GeocodingError> for AppError {
    fn from(e: GeocodingError) -> Self {
        match e {
            GeocodingError::NotConfigured | GeocodingError::Http(_) => {
                AppError::with_message(ErrorCode::GeocodingUnavailable, e.to_string())
            }
            _ => AppError::with_message(ErrorCode::GeocodingFailed, e.to_string()),
        }
    }
}

/// Point of interest near a location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,
    pub full_name: String,
    pub longitude: Decimal,
    pub latitude: Decimal,
}

/// `(keys, latitude, longitude)`, coordinates scaled by 10^4
const FALLBACK_CITIES: &[(&[&str], i64, i64)] = &[
    (&["харьков", "kharkiv", "kharkov"], 499_935, 362_304),
    (&["киев", "kiev", "kyiv"], 504_501, 305_234),
    (&["одесса", "odesa", "odessa"], 464_825, 307_233),
    (&["москва", "moscow"], 557_558, 376_176),
    (&["петербург", "spb", "petersburg"], 599_311, 303_609),
    (&["new york"], 407_128, -740_060),
    (&["los angeles"], 340_522, -1_182_437),
    (&["berlin"], 525_200, 134_050),
];

const FALLBACK_DEFAULT: (i64, i64) = (500_000, 200_000);

/// Coordinates from the static table; the first matching entry wins
pub fn fallback_coordinates(city_key: &str) -> (Decimal, Decimal) {
    let key = city_key.to_lowercase();
    let (lat, lon) = FALLBACK_CITIES
        .iter()
        .find(|(names, _, _)| names.iter().any(|n| key.contains(n)))
        .map(|(_, lat, lon)| (*lat, *lon))
        .unwrap_or(FALLBACK_DEFAULT);
    (Decimal::new(lat, 4), Decimal::new(lon, 4))
}

/// `abcdefgh...wxyz (length: n)`
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return format!("*** (length: {})", chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail} (length: {})", chars.len())
}

fn round_coordinate(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(COORDINATE_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// `features[i].center` or `geometry.coordinates`, as `(lat, lon)`
fn feature_coordinates(feature: &serde_json::Value) -> Option<(Decimal, Decimal)> {
    let coords = feature
        .pointer("/geometry/coordinates")
        .or_else(|| feature.get("center"))?
        .as_array()?;
    let lon = round_coordinate(coords.first()?.as_f64()?)?;
    let lat = round_coordinate(coords.get(1)?.as_f64()?)?;
    Some((lat, lon))
}

fn first_feature(body: &serde_json::Value) -> Option<&serde_json::Value> {
    body.get("features")?.as_array()?.first()
}

pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    available: AtomicBool,
}

impl GeocodingService {
    pub fn new(access_token: &str, base_url: &str) -> Result<Self, GeocodingError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.trim().to_string(),
            available: AtomicBool::new(false),
        })
    }

    pub fn token_set(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Probe the API once; fallback mode when the token is missing or the probe fails
    pub async fn validate(&self) -> bool {
        if !self.token_set() {
            tracing::warn!("MAPBOX_ACCESS_TOKEN not set, geocoding runs in fallback mode");
            self.available.store(false, Ordering::Relaxed);
            return false;
        }

        tracing::info!(token = %mask_token(&self.access_token), "Validating Mapbox token");
        let ok = match self.geocode(PROBE_ADDRESS).await {
            Ok((lat, lon)) => {
                tracing::info!(%lat, %lon, "Mapbox geocoding available");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Mapbox validation failed, using fallback coordinates");
                false
            }
        };
        self.available.store(ok, Ordering::Relaxed);
        ok
    }

    fn endpoint(&self, segment: &str) -> Result<reqwest::Url, GeocodingError> {
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|e| GeocodingError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GeocodingError::Url(self.base_url.clone()))?
            .push(&format!("{segment}.json"));
        Ok(url)
    }

    async fn get_json(
        &self,
        url: reqwest::Url,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, GeocodingError> {
        if !self.token_set() {
            return Err(GeocodingError::NotConfigured);
        }
        let body = self
            .client
            .get(url)
            .query(&[("access_token", self.access_token.as_str())])
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }

    /// Forward geocode, `(latitude, longitude)`
    pub async fn geocode(&self, address: &str) -> Result<(Decimal, Decimal), GeocodingError> {
        let url = self.endpoint(address)?;
        let body = self
            .get_json(
                url,
                &[("limit", "1".into()), ("types", "address,poi".into())],
            )
            .await?;
        first_feature(&body)
            .and_then(feature_coordinates)
            .ok_or_else(|| GeocodingError::NoResults(address.to_string()))
    }

    /// Coordinates for a store address
    ///
    /// Explicit coordinates win; otherwise the API is asked when available and
    /// `auto_geocode` is set; every other case uses the fallback table.
    pub async fn resolve_address(&self, input: AddressInput) -> Address {
        if let Some((lat, lon)) = input.explicit_coordinates() {
            return input.into_address(lat, lon);
        }

        if input.auto_geocode && self.is_available() {
            let formatted = input.format();
            match self.geocode(&formatted).await {
                Ok((lat, lon)) => {
                    tracing::info!(address = %formatted, %lat, %lon, "Address geocoded");
                    return input.into_address(lat, lon);
                }
                Err(e) => {
                    tracing::warn!(address = %formatted, error = %e, "Geocoding failed, using fallback");
                }
            }
        }

        let (lat, lon) = fallback_coordinates(&input.city_key());
        tracing::debug!(city = %input.city_key(), %lat, %lon, "Fallback coordinates");
        input.into_address(lat, lon)
    }

    /// Place name for a coordinate pair
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<String> {
        if !self.is_available() {
            return None;
        }
        let result = async {
            let url = self.endpoint(&format!("{longitude},{latitude}"))?;
            self.get_json(url, &[("types", "address".into())]).await
        }
        .await;
        match result {
            Ok(body) => first_feature(&body)
                .and_then(|f| f.get("place_name"))
                .and_then(|v| v.as_str())
                .map(String::from),
            Err(e) => {
                tracing::warn!(latitude, longitude, error = %e, "Reverse geocoding failed");
                None
            }
        }
    }

    /// Points of interest matching `query`, biased towards the given location
    pub async fn search_nearby_places(
        &self,
        query: &str,
        latitude: f64,
        longitude: f64,
        limit: u32,
    ) -> Vec<Place> {
        if !self.is_available() {
            return Vec::new();
        }
        let result = async {
            let url = self.endpoint(query)?;
            self.get_json(
                url,
                &[
                    ("proximity", format!("{longitude},{latitude}")),
                    ("types", "poi".into()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
        }
        .await;
        match result {
            Ok(body) => parse_places(&body),
            Err(e) => {
                tracing::warn!(query, error = %e, "Place search failed");
                Vec::new()
            }
        }
    }
}

fn parse_places(body: &serde_json::Value) -> Vec<Place> {
    let Some(features) = body.get("features").and_then(|f| f.as_array()) else {
        return Vec::new();
    };
    features
        .iter()
        .filter_map(|f| {
            let (latitude, longitude) = feature_coordinates(f)?;
            Some(Place {
                name: f.get("text")?.as_str()?.to_string(),
                full_name: f.get("place_name")?.as_str()?.to_string(),
                longitude,
                latitude,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn input(city: &str, country: Option<&str>) -> AddressInput {
        AddressInput {
            street: "Main 1".into(),
            city: city.into(),
            country: country.map(String::from),
            auto_geocode: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_fallback_table_matches_contains() {
        assert_eq!(fallback_coordinates("kharkiv, ukraine"), (d("49.9935"), d("36.2304")));
        assert_eq!(fallback_coordinates("Київ, kyiv"), (d("50.4501"), d("30.5234")));
        assert_eq!(fallback_coordinates("new york, usa"), (d("40.7128"), d("-74.006")));
        assert_eq!(fallback_coordinates("lviv, ukraine"), (d("50"), d("20")));
    }

    #[test]
    fn test_fallback_first_match_wins() {
        // Both "kharkiv" and "kyiv" appear; the kharkiv row comes first
        assert_eq!(fallback_coordinates("kyiv street, kharkiv"), (d("49.9935"), d("36.2304")));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(
            mask_token("pk.eyJ1Ijoiabcdefghijklmnop"),
            "pk.eyJ1I...mnop (length: 27)"
        );
        assert_eq!(mask_token("short"), "*** (length: 5)");
    }

    #[test]
    fn test_feature_coordinates_rounded() {
        let body = serde_json::json!({
            "features": [{"geometry": {"coordinates": [-74.0060151234567, 40.7127281]}}]
        });
        let (lat, lon) = first_feature(&body).and_then(feature_coordinates).unwrap();
        assert_eq!(lat, d("40.7127281"));
        assert_eq!(lon, d("-74.00601512"));
    }

    #[test]
    fn test_parse_places_skips_incomplete() {
        let body = serde_json::json!({
            "features": [
                {"text": "Cafe", "place_name": "Cafe, Kyiv", "center": [30.5, 50.4]},
                {"text": "No coords", "place_name": "Nowhere"}
            ]
        });
        let places = parse_places(&body);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].full_name, "Cafe, Kyiv");
        assert_eq!(places[0].latitude, d("50.4"));
    }

    #[test]
    fn test_endpoint_encodes_address() {
        let svc = GeocodingService::new("token", "https://api.mapbox.com/geocoding/v5/mapbox.places/")
            .unwrap();
        let url = svc.endpoint("Sumska 1/2, Kharkiv").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/Sumska%201%2F2,%20Kharkiv.json"
        );
    }

    #[tokio::test]
    async fn test_without_token_uses_fallback() {
        let svc = GeocodingService::new("", crate::config::DEFAULT_MAPBOX_BASE_URL).unwrap();
        assert!(!svc.validate().await);
        assert!(!svc.is_available());

        let address = svc.resolve_address(input("Odessa", Some("Ukraine"))).await;
        assert_eq!(address.latitude, Some(d("46.4825")));
        assert_eq!(address.longitude, Some(d("30.7233")));
        assert_eq!(address.full_address.as_deref(), Some("Main 1, Odessa, Ukraine"));

        assert!(svc.reverse_geocode(50.0, 30.0).await.is_none());
        assert!(svc.search_nearby_places("cafe", 50.0, 30.0, 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_coordinates_win() {
        let svc = GeocodingService::new("", crate::config::DEFAULT_MAPBOX_BASE_URL).unwrap();
        let mut req = input("Berlin", None);
        req.latitude = Some(d("1.5"));
        req.longitude = Some(d("2.5"));
        let address = svc.resolve_address(req).await;
        assert_eq!(address.coordinates(), Some((1.5, 2.5)));
    }

    #[tokio::test]
    async fn test_geocode_without_token_not_configured() {
        let svc = GeocodingService::new("", crate::config::DEFAULT_MAPBOX_BASE_URL).unwrap();
        let err = svc.geocode("Berlin").await.unwrap_err();
        assert!(matches!(err, GeocodingError::NotConfigured));
        assert_eq!(AppError::from(err).code, ErrorCode::GeocodingUnavailable);
    }
}
