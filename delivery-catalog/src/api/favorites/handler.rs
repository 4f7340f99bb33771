//! Favorite API Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Favorite, FavoriteAdd};
use shared::response::{DataResponse, ResponseMetadata};

use crate::api::extract::{AppJson, AppPath};
use crate::api::{ApiResult, internal, now};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

fn metadata(total_count: i64, user_id: i64, operation: &str) -> ResponseMetadata {
    ResponseMetadata {
        total_count,
        user_id,
        operation: operation.to_string(),
    }
}

fn already_favorite(store_id: i64) -> AppError {
    AppError::new(ErrorCode::FavoriteAlreadyExists).with_detail("storeId", store_id)
}

/// Insert the favorite; the caller picks the status code.
///
/// An existing favorite wins over the store checks, so re-adding a store that
/// was deactivated later still reports the duplicate.
async fn add_favorite(state: &AppState, user_id: i64, store_id: i64) -> ServiceResult<Favorite> {
    if db::favorite::exists(&state.pool, user_id, store_id).await? {
        return Err(already_favorite(store_id).into());
    }

    let store = db::store::find_by_id(&state.pool, store_id)
        .await?
        .ok_or_else(|| AppError::store_not_found(store_id))?;
    if !store.is_active {
        return Err(AppError::new(ErrorCode::StoreInactive).with_detail("storeId", store_id).into());
    }

    let inserted = db::favorite::insert(&state.pool, user_id, store_id, now()).await?;
    if !inserted {
        return Err(already_favorite(store_id).into());
    }

    let favorite = db::favorite::find(&state.pool, user_id, store_id)
        .await?
        .ok_or_else(|| AppError::internal("Favorite vanished after insert"))?;
    tracing::info!(user_id, store_id, "Store added to favorites");
    Ok(favorite)
}

async fn list_favorites(
    state: &AppState,
    user: &CurrentUser,
    active_only: bool,
) -> ApiResult<DataResponse<Vec<Favorite>>> {
    let user_id = user.require_user_id()?;
    let favorites = db::favorite::list_by_user(&state.pool, user_id, active_only)
        .await
        .map_err(internal)?;
    let (message, operation) = if active_only {
        ("Active favorites retrieved successfully", "LIST_ACTIVE")
    } else {
        ("Favorites retrieved successfully", "LIST")
    };
    let total = favorites.len() as i64;
    Ok(Json(
        DataResponse::success(favorites, message).with_metadata(metadata(total, user_id, operation)),
    ))
}

/// GET /api/favorites
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<DataResponse<Vec<Favorite>>> {
    list_favorites(&state, &user, false).await
}

/// GET /api/favorites/active
pub async fn list_active(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<DataResponse<Vec<Favorite>>> {
    list_favorites(&state, &user, true).await
}

async fn add_response(
    state: &AppState,
    user_id: i64,
    store_id: i64,
) -> Result<(StatusCode, Json<DataResponse<Favorite>>), AppError> {
    let favorite = add_favorite(state, user_id, store_id).await?;
    let total = db::favorite::count_by_user(&state.pool, user_id)
        .await
        .map_err(internal)?;
    Ok((
        StatusCode::CREATED,
        Json(
            DataResponse::success(favorite, "Store added to favorites")
                .with_metadata(metadata(total, user_id, "ADD")),
        ),
    ))
}

/// POST /api/favorites/stores/{store_id}
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(store_id): AppPath<i64>,
) -> Result<(StatusCode, Json<DataResponse<Favorite>>), AppError> {
    let user_id = user.require_user_id()?;
    add_response(&state, user_id, store_id).await
}

/// POST /api/favorites with `{storeId}`
pub async fn add_from_body(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(req): AppJson<FavoriteAdd>,
) -> Result<(StatusCode, Json<DataResponse<Favorite>>), AppError> {
    let user_id = user.require_user_id()?;
    add_response(&state, user_id, req.store_id).await
}

/// DELETE /api/favorites/stores/{store_id}
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(store_id): AppPath<i64>,
) -> ApiResult<DataResponse<&'static str>> {
    let user_id = user.require_user_id()?;
    let removed = db::favorite::delete(&state.pool, user_id, store_id)
        .await
        .map_err(internal)?;
    if !removed {
        return Err(AppError::new(ErrorCode::FavoriteNotFound).with_detail("storeId", store_id));
    }
    let total = db::favorite::count_by_user(&state.pool, user_id)
        .await
        .map_err(internal)?;
    tracing::info!(user_id, store_id, "Store removed from favorites");
    Ok(Json(
        DataResponse::success("removed", "Store removed from favorites")
            .with_metadata(metadata(total, user_id, "REMOVE")),
    ))
}

/// Message and metadata operation of a toggle
fn toggle_outcome(removed: bool) -> (&'static str, &'static str) {
    if removed {
        ("Store removed from favorites", "TOGGLE_REMOVE")
    } else {
        ("Store added to favorites", "TOGGLE_ADD")
    }
}

/// PUT /api/favorites/stores/{store_id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(store_id): AppPath<i64>,
) -> ApiResult<DataResponse<Favorite>> {
    let user_id = user.require_user_id()?;

    let removed = db::favorite::delete(&state.pool, user_id, store_id)
        .await
        .map_err(internal)?;
    let (message, operation) = toggle_outcome(removed);
    let response = if removed {
        tracing::info!(user_id, store_id, "Store removed from favorites");
        DataResponse::empty(message)
    } else {
        DataResponse::success(add_favorite(&state, user_id, store_id).await?, message)
    };

    let total = db::favorite::count_by_user(&state.pool, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(response.with_metadata(metadata(total, user_id, operation))))
}

/// GET /api/favorites/stores/{store_id}/status
pub async fn status(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(store_id): AppPath<i64>,
) -> ApiResult<DataResponse<bool>> {
    let user_id = user.require_user_id()?;
    let is_favorite = db::favorite::exists(&state.pool, user_id, store_id)
        .await
        .map_err(internal)?;
    Ok(Json(DataResponse::success(is_favorite, "Favorite status retrieved")))
}

/// GET /api/favorites/count
pub async fn count(State(state): State<AppState>, user: CurrentUser) -> ApiResult<DataResponse<i64>> {
    let user_id = user.require_user_id()?;
    let total = db::favorite::count_by_user(&state.pool, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(
        DataResponse::success(total, "Favorites count retrieved")
            .with_metadata(metadata(total, user_id, "COUNT")),
    ))
}

/// GET /api/favorites/stores/{store_id}/count - no identity needed
pub async fn store_count(
    State(state): State<AppState>,
    AppPath(store_id): AppPath<i64>,
) -> ApiResult<DataResponse<i64>> {
    let total = db::favorite::count_by_store(&state.pool, store_id)
        .await
        .map_err(internal)?;
    Ok(Json(DataResponse::success(total, "Store favorites count retrieved")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::Value;
    use sqlx::PgPool;

    use crate::api::test_support::{
        app_with_pool, body_json, create_store, request, send, token,
    };

    #[test]
    fn test_toggle_outcome_labels() {
        assert_eq!(toggle_outcome(true), ("Store removed from favorites", "TOGGLE_REMOVE"));
        assert_eq!(toggle_outcome(false), ("Store added to favorites", "TOGGLE_ADD"));
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_readding_favorite_conflicts_even_after_deactivation(pool: PgPool) {
        let (app, _) = app_with_pool(pool);
        let owner = token(10, "ROLE_BUSINESS");
        let user = token(20, "ROLE_USER");
        let store_id = create_store(&app, &owner, "Borsch House").await;
        let uri = format!("/api/favorites/stores/{store_id}");

        let resp = send(&app, request(Method::POST, &uri, Some(&user))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["store"]["id"], store_id);
        assert_eq!(json["metadata"]["operation"], "ADD");
        assert_eq!(json["metadata"]["totalCount"], 1);

        let resp = send(&app, request(Method::POST, &uri, Some(&user))).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::FavoriteAlreadyExists.code());

        let resp = send(
            &app,
            request(Method::DELETE, &format!("/api/stores/{store_id}"), Some(&owner)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = send(&app, request(Method::POST, &uri, Some(&user))).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::FavoriteAlreadyExists.code());
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_toggle_alternates_add_and_remove(pool: PgPool) {
        let (app, _) = app_with_pool(pool);
        let owner = token(11, "ROLE_BUSINESS");
        let user = token(21, "ROLE_USER");
        let store_id = create_store(&app, &owner, "Varenyky").await;
        let uri = format!("/api/favorites/stores/{store_id}/toggle");

        let resp = send(&app, request(Method::PUT, &uri, Some(&user))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Store added to favorites");
        assert_eq!(json["metadata"]["operation"], "TOGGLE_ADD");
        assert_eq!(json["metadata"]["totalCount"], 1);
        assert_eq!(json["data"]["store"]["id"], store_id);

        let resp = send(&app, request(Method::PUT, &uri, Some(&user))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Store removed from favorites");
        assert_eq!(json["metadata"]["operation"], "TOGGLE_REMOVE");
        assert_eq!(json["metadata"]["totalCount"], 0);
        assert_eq!(json["data"], Value::Null);

        send(
            &app,
            request(Method::DELETE, &format!("/api/stores/{store_id}"), Some(&owner)),
        )
        .await;
        let resp = send(&app, request(Method::PUT, &uri, Some(&user))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["code"], ErrorCode::StoreInactive.code());
    }
}
