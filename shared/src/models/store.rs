//! Store Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::{Address, AddressInput};
use crate::response::Resource;

/// Store entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub rating: Decimal,
    pub delivery_radius: Option<i32>,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
    pub pic_url: String,
    /// Storage id of the picture, never exposed to clients
    #[serde(skip)]
    pub pic_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Resource for Store {
    const ONE: &'static str = "store";
    const MANY: &'static str = "stores";
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCreate {
    pub name: String,
    pub description: Option<String>,
    pub address: AddressInput,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub delivery_radius: Option<i32>,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Update store payload (every field optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<AddressInput>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub delivery_radius: Option<i32>,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
    pub is_active: Option<bool>,
}

/// Home-screen card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StoreUi {
    pub id: i64,
    pub name: String,
    pub pic_url: String,
    pub rating: Decimal,
    pub estimated_delivery_time: Option<i32>,
}

impl Resource for StoreUi {
    const ONE: &'static str = "store";
    const MANY: &'static str = "stores";
}

/// Lightweight listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StoreBrief {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub rating: Decimal,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
    pub pic_url: String,
    pub address_city: String,
    pub address_street: String,
}

impl Resource for StoreBrief {
    const ONE: &'static str = "store";
    const MANY: &'static str = "stores";
}

/// Sort order for nearby search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NearbySort {
    #[default]
    Distance,
    Rating,
    DeliveryTime,
    DeliveryFee,
}

/// Query string of `GET /api/stores/nearby`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStoreQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_nearby_limit")]
    pub limit: usize,
    #[serde(default)]
    pub sort_by: NearbySort,
    pub max_delivery_fee: Option<Decimal>,
    pub max_delivery_time: Option<i32>,
    pub min_rating: Option<Decimal>,
}

/// A store with its distance from the search origin
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStore {
    #[serde(flatten)]
    pub store: Store,
    pub distance_km: f64,
}

impl Resource for NearbyStore {
    const ONE: &'static str = "store";
    const MANY: &'static str = "stores";
}

fn default_true() -> bool {
    true
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_nearby_limit() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store {
            id: 1,
            owner_id: 10,
            name: "Pizza Place".into(),
            description: None,
            address: Address {
                street: "Main 1".into(),
                city: "Berlin".into(),
                ..Default::default()
            },
            phone: None,
            email: None,
            is_active: true,
            rating: Decimal::new(45, 1),
            delivery_radius: Some(5),
            delivery_fee: Some(Decimal::new(299, 2)),
            estimated_delivery_time: Some(30),
            pic_url: "https://img/1.jpg".into(),
            pic_id: Some("stores/20240101_000000_123456".into()),
            created_at: 1,
            updated_at: 2,
        }
    }

    #[test]
    fn test_store_serializes_camel_case_without_pic_id() {
        let json = serde_json::to_value(store()).unwrap();
        assert_eq!(json["ownerId"], 10);
        assert_eq!(json["address"]["street"], "Main 1");
        assert_eq!(json["estimatedDeliveryTime"], 30);
        assert!(json.get("picId").is_none());
        assert!(json.get("pic_id").is_none());
    }

    #[test]
    fn test_nearby_store_flattens_store() {
        let nearby = NearbyStore {
            store: store(),
            distance_km: 1.25,
        };
        let json = serde_json::to_value(nearby).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["distanceKm"], 1.25);
    }

    #[test]
    fn test_create_defaults() {
        let req: StoreCreate = serde_json::from_str(
            r#"{"name":"A","address":{"street":"S","city":"C"}}"#,
        )
        .unwrap();
        assert!(req.is_active);
        assert!(req.address.auto_geocode);
    }

    #[test]
    fn test_nearby_query_defaults() {
        let q: NearbyStoreQuery =
            serde_json::from_str(r#"{"latitude":50.0,"longitude":30.0}"#).unwrap();
        assert_eq!(q.radius_km, 10.0);
        assert_eq!(q.limit, 20);
        assert_eq!(q.sort_by, NearbySort::Distance);

        let q: NearbyStoreQuery = serde_json::from_str(
            r#"{"latitude":50.0,"longitude":30.0,"sortBy":"deliveryFee"}"#,
        )
        .unwrap();
        assert_eq!(q.sort_by, NearbySort::DeliveryFee);
    }
}
