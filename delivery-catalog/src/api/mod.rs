//! HTTP routes
//!
//! - [`health`] - liveness
//! - [`stores`] - stores, nearby search
//! - [`products`] - products
//! - [`categories`] - categories
//! - [`favorites`] - per-user favorite stores
//! - [`geo`] - place search and reverse geocoding
//! - [`diagnostics`] - `/api/test/*` helpers

pub mod extract;
pub mod logging;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub mod categories;
pub mod diagnostics;
pub mod favorites;
pub mod geo;
pub mod health;
pub mod products;
pub mod stores;

use axum::extract::DefaultBodyLimit;
use axum::{Json, Router, middleware};
use shared::error::{AppError, ErrorCode};
use shared::models::Store;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::auth::identity_middleware;
use crate::error::ServiceResult;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Log an infrastructure failure and hide it behind `InternalError`
pub(crate) fn internal(e: impl std::fmt::Display) -> AppError {
    tracing::error!(error = %e, "Internal error");
    AppError::new(ErrorCode::InternalError)
}

/// Current time in Unix millis
pub(crate) fn now() -> i64 {
    shared::util::now_millis()
}

/// The store, if `user_id` owns it; 404 when missing, 403 otherwise
pub(crate) async fn owned_store(state: &AppState, store_id: i64, user_id: i64) -> ServiceResult<Store> {
    let store = crate::db::store::find_by_id(&state.pool, store_id)
        .await?
        .ok_or_else(|| AppError::store_not_found(store_id))?;
    ensure_owner(&store, user_id)?;
    Ok(store)
}

pub(crate) fn ensure_owner(store: &Store, user_id: i64) -> Result<(), AppError> {
    if store.owner_id != user_id {
        return Err(AppError::with_message(
            ErrorCode::NotOwner,
            "Access denied: you do not own this store",
        )
        .with_detail("storeId", store.id));
    }
    Ok(())
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(stores::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(favorites::router())
        .merge(geo::router())
        .merge(diagnostics::router());

    Router::new()
        .merge(health::router())
        .merge(api)
        .layer(middleware::from_fn(logging::logging_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), identity_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(state.config.max_request_size))
        .with_state(state)
}
