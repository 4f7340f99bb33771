//! Favorite store API
//!
//! Every route except the store popularity count needs a user id.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/favorites", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::add_from_body))
        .route("/active", get(handler::list_active))
        .route("/count", get(handler::count))
        .route(
            "/stores/{store_id}",
            post(handler::add).delete(handler::remove),
        )
        .route("/stores/{store_id}/toggle", put(handler::toggle))
        .route("/stores/{store_id}/status", get(handler::status))
        .route("/stores/{store_id}/count", get(handler::store_count))
}
