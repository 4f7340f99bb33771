//! Product API

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/simple", post(handler::create_simple))
        .route("/search", get(handler::search))
        .route("/health", get(handler::health))
        .route("/store/{store_id}", get(handler::by_store))
        .route("/store/{store_id}/brief", get(handler::brief_by_store))
        .route("/store/{store_id}/popular", get(handler::popular))
        .route("/category/{category_id}", get(handler::by_category))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::soft_delete),
        )
        .route("/{id}/hard", delete(handler::hard_delete))
}
