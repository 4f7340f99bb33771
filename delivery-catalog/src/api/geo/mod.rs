//! Geocoding API
//!
//! Thin routes over [`GeocodingService`](crate::services::GeocodingService).
//! Both return empty data when the service runs in fallback mode.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use shared::error::AppError;
use shared::response::DataResponse;

use crate::api::ApiResult;
use crate::api::extract::AppQuery;
use crate::services::geocoding::Place;
use crate::state::AppState;
use crate::validation::{validate_range, validate_required_text, MAX_SEARCH_LEN};

const PLACES_LIMIT: (u32, u32) = (1, 10);

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/geo", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/places", get(places))
        .route("/reverse", get(reverse))
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    query: String,
    latitude: f64,
    longitude: f64,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    latitude: f64,
    longitude: f64,
}

fn validate_point(latitude: f64, longitude: f64) -> Result<(), AppError> {
    validate_range(Some(latitude), "latitude", (-90.0, 90.0))?;
    validate_range(Some(longitude), "longitude", (-180.0, 180.0))
}

/// GET /api/geo/places?query&latitude&longitude&limit
async fn places(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<PlacesQuery>,
) -> ApiResult<DataResponse<Vec<Place>>> {
    validate_required_text(&q.query, "query", MAX_SEARCH_LEN)?;
    validate_point(q.latitude, q.longitude)?;
    validate_range(Some(q.limit), "limit", PLACES_LIMIT)?;

    let places = state
        .geocoder
        .search_nearby_places(q.query.trim(), q.latitude, q.longitude, q.limit)
        .await;
    let message = format!("Found {} places", places.len());
    Ok(Json(DataResponse::success(places, message)))
}

/// GET /api/geo/reverse?latitude&longitude
async fn reverse(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<ReverseQuery>,
) -> ApiResult<DataResponse<String>> {
    validate_point(q.latitude, q.longitude)?;
    let response = match state.geocoder.reverse_geocode(q.latitude, q.longitude).await {
        Some(address) => DataResponse::success(address, "Address found"),
        None => DataResponse::empty("No address found for these coordinates"),
    };
    Ok(Json(response))
}
