//! Store address

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Address embedded in a store row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub full_address: Option<String>,
}

impl Address {
    /// `street, city[, region][, country]`
    pub fn format(&self) -> String {
        format_address(
            &self.street,
            &self.city,
            self.region.as_deref(),
            self.country.as_deref(),
        )
    }

    /// Fill `full_address` from the formatted parts when it is empty
    pub fn with_full_address(mut self) -> Self {
        if self.full_address.as_deref().is_none_or(|s| s.trim().is_empty()) {
            self.full_address = Some(self.format());
        }
        self
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?.to_f64()?, self.longitude?.to_f64()?))
    }

    /// Great-circle distance to another address, `None` if either side has no coordinates
    pub fn distance_to_km(&self, other: &Address) -> Option<f64> {
        let (lat1, lon1) = self.coordinates()?;
        let (lat2, lon2) = other.coordinates()?;
        Some(haversine_km(lat1, lon1, lat2, lon2))
    }
}

/// Address as submitted by clients when creating or updating a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub full_address: Option<String>,
    /// Ask the geocoder for coordinates when none are given
    #[serde(default = "default_true")]
    pub auto_geocode: bool,
}

impl AddressInput {
    pub fn format(&self) -> String {
        format_address(
            &self.street,
            &self.city,
            self.region.as_deref(),
            self.country.as_deref(),
        )
    }

    /// Lowercased `city, country`, the key used by the fallback coordinate table
    pub fn city_key(&self) -> String {
        match self.country.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(country) => format!("{}, {}", self.city.trim(), country.trim()).to_lowercase(),
            None => self.city.trim().to_lowercase(),
        }
    }

    /// Both explicit coordinates were provided
    pub fn explicit_coordinates(&self) -> Option<(Decimal, Decimal)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Build the stored address with the resolved coordinates
    pub fn into_address(self, latitude: Decimal, longitude: Decimal) -> Address {
        Address {
            street: self.street,
            city: self.city,
            region: self.region,
            country: self.country,
            postal_code: self.postal_code,
            latitude: Some(latitude),
            longitude: Some(longitude),
            full_address: self.full_address,
        }
        .with_full_address()
    }
}

fn default_true() -> bool {
    true
}

fn format_address(street: &str, city: &str, region: Option<&str>, country: Option<&str>) -> String {
    let mut out = format!("{street}, {city}");
    for part in [region, country].into_iter().flatten() {
        if !part.trim().is_empty() {
            out.push_str(", ");
            out.push_str(part);
        }
    }
    out
}

/// Haversine distance in kilometres
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn kyiv() -> Address {
        Address {
            street: "Khreshchatyk 1".into(),
            city: "Kyiv".into(),
            country: Some("Ukraine".into()),
            latitude: Some(d("50.4501")),
            longitude: Some(d("30.5234")),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_skips_missing_parts() {
        let mut addr = kyiv();
        assert_eq!(addr.format(), "Khreshchatyk 1, Kyiv, Ukraine");

        addr.region = Some("Kyiv Oblast".into());
        assert_eq!(addr.format(), "Khreshchatyk 1, Kyiv, Kyiv Oblast, Ukraine");

        addr.country = Some("  ".into());
        addr.region = None;
        assert_eq!(addr.format(), "Khreshchatyk 1, Kyiv");
    }

    #[test]
    fn test_full_address_filled_only_when_empty() {
        let addr = kyiv().with_full_address();
        assert_eq!(
            addr.full_address.as_deref(),
            Some("Khreshchatyk 1, Kyiv, Ukraine")
        );

        let mut custom = kyiv();
        custom.full_address = Some("Main square".into());
        assert_eq!(
            custom.with_full_address().full_address.as_deref(),
            Some("Main square")
        );
    }

    #[test]
    fn test_distance_kyiv_kharkiv() {
        let kharkiv = Address {
            street: "Sumska 1".into(),
            city: "Kharkiv".into(),
            latitude: Some(d("49.9935")),
            longitude: Some(d("36.2304")),
            ..Default::default()
        };
        let d = kyiv().distance_to_km(&kharkiv).unwrap();
        assert!((d - 409.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_distance_requires_coordinates() {
        let mut other = kyiv();
        other.latitude = None;
        assert!(kyiv().distance_to_km(&other).is_none());
        assert_eq!(kyiv().distance_to_km(&kyiv()), Some(0.0));
    }

    #[test]
    fn test_city_key() {
        let input = AddressInput {
            street: "x".into(),
            city: " Kharkiv ".into(),
            country: Some("Ukraine".into()),
            ..Default::default()
        };
        assert_eq!(input.city_key(), "kharkiv, ukraine");

        let input = AddressInput {
            city: "Berlin".into(),
            ..Default::default()
        };
        assert_eq!(input.city_key(), "berlin");
    }

    #[test]
    fn test_auto_geocode_defaults_to_true() {
        let input: AddressInput =
            serde_json::from_str(r#"{"street":"Unter den Linden 1","city":"Berlin"}"#).unwrap();
        assert!(input.auto_geocode);
        assert!(input.explicit_coordinates().is_none());
    }
}
