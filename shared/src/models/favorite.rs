//! Favorite store Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store summary embedded in a favorite entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStoreSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub pic_url: String,
    pub is_active: bool,
    pub rating: Decimal,
    pub delivery_radius: Option<i32>,
    pub estimated_delivery_time: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A user's favorite store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub store: FavoriteStoreSummary,
    pub created_at: i64,
}

/// `POST /api/favorites` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteAdd {
    pub store_id: i64,
}
