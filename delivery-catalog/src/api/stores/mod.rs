//! Store API

mod handler;
mod nearby;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/stores", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/simple", post(handler::create_simple))
        .route("/my", get(handler::mine))
        .route("/ui", get(handler::ui))
        .route("/brief", get(handler::brief))
        .route("/search", get(handler::search))
        .route("/nearby", get(handler::nearby))
        .route("/health", get(handler::health))
        .route("/owner/{owner_id}", get(handler::by_owner))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::deactivate),
        )
}
