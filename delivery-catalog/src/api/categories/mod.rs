//! Category API

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/brief", get(handler::brief))
        .route("/brief/by-ids", post(handler::brief_by_ids))
        .route("/search", get(handler::search))
        .route("/stats", get(handler::stats))
        .route("/count", get(handler::count))
        .route("/info", get(handler::info))
        .route("/health", get(handler::health))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/brief", get(handler::get_brief))
        .route("/{id}/toggle-status", patch(handler::toggle_status))
}
