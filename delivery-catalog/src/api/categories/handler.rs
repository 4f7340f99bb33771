//! Category API Handlers

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryBrief, CategoryPayload, CategoryServiceInfo, CategoryStat};
use shared::response::{ItemResponse, ListResponse};

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::upload::{self, read_form, settle_image_write};
use crate::api::{ApiResult, internal, now};
use crate::auth::{CurrentUser, Role};
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::validation;

const IMAGE_FOLDER: &str = "categories";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    statistics: Vec<CategoryStat>,
    total_categories: i64,
    success: bool,
    message: String,
    generated_at: i64,
}

fn name_exists(name: &str) -> AppError {
    AppError::with_message(
        ErrorCode::CategoryNameExists,
        format!("Category with name '{}' already exists", name.trim()),
    )
}

async fn find(state: &AppState, id: i64) -> ServiceResult<Category> {
    let category = db::category::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::category_not_found(id))?;
    Ok(category)
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> ApiResult<ListResponse<Category>> {
    let rows = db::category::list_active(&state.pool)
        .await
        .map_err(internal)?;
    Ok(Json(ListResponse::new(rows)))
}

/// GET /api/categories/brief
pub async fn brief(State(state): State<AppState>) -> ApiResult<ListResponse<CategoryBrief>> {
    let rows = db::category::list_brief_active(&state.pool)
        .await
        .map_err(internal)?;
    Ok(Json(ListResponse::new(rows)))
}

/// POST /api/categories/brief/by-ids
pub async fn brief_by_ids(
    State(state): State<AppState>,
    AppJson(ids): AppJson<Vec<i64>>,
) -> ApiResult<ListResponse<CategoryBrief>> {
    if ids.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Category ids must not be empty",
        ));
    }
    let rows = db::category::list_brief_by_ids(&state.pool, &ids)
        .await
        .map_err(internal)?;
    Ok(Json(ListResponse::new(rows)))
}

/// GET /api/categories/{id} - active or not
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ItemResponse<Category>> {
    Ok(Json(ItemResponse::new(find(&state, id).await?)))
}

/// GET /api/categories/{id}/brief
pub async fn get_brief(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ItemResponse<CategoryBrief>> {
    let brief = db::category::find_brief(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::category_not_found(id))?;
    Ok(Json(ItemResponse::new(brief)))
}

/// GET /api/categories/search?name=
pub async fn search(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> ApiResult<ListResponse<Category>> {
    let term = validation::search_term(&query.name)?;
    let rows = db::category::search_active(&state.pool, &term)
        .await
        .map_err(internal)?;
    Ok(Json(ListResponse::new(rows)))
}

/// GET /api/categories/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let statistics = db::category::stats(&state.pool).await.map_err(internal)?;
    let total_categories = statistics.iter().map(|s| s.count).sum();
    Ok(Json(StatsResponse {
        statistics,
        total_categories,
        success: true,
        message: "Category statistics retrieved successfully".to_string(),
        generated_at: now(),
    }))
}

/// POST /api/categories - multipart `data` + optional `image`, admin only
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ItemResponse<Category>>), AppError> {
    user.require_role(Role::Admin)?;
    let mut form = read_form(multipart, state.config.max_file_size).await?;
    let req: CategoryPayload = form.json()?;
    validation::validate_category(&req)?;

    if db::category::active_name_taken(&state.pool, &req.name, None)
        .await
        .map_err(internal)?
    {
        return Err(name_exists(&req.name));
    }

    let pic = match form.image.take() {
        Some(file) => Some(upload::store_image(&state, file, IMAGE_FOLDER).await?),
        None => None,
    };

    let pic_id = pic.as_ref().map(|p| p.public_id.as_str());
    let written = db::category::insert(
        &state.pool,
        &req,
        pic.as_ref().map(|p| p.url.as_str()),
        pic_id,
        now(),
    )
    .await;
    let category = settle_image_write(state.storage.as_ref(), written, pic_id, None).await?;

    tracing::info!(category_id = category.id, name = %category.name, "Category created");
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse::with_message(category, "Category created successfully")),
    ))
}

/// PUT /api/categories/{id} - multipart `data` + optional `image`, admin only
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
    multipart: Multipart,
) -> ApiResult<ItemResponse<Category>> {
    user.require_role(Role::Admin)?;
    let mut form = read_form(multipart, state.config.max_file_size).await?;
    let req: CategoryPayload = form.json()?;
    validation::validate_category(&req)?;

    let mut category = find(&state, id).await?;

    let name = req.name.trim();
    if !name.eq_ignore_ascii_case(&category.name)
        && db::category::active_name_taken(&state.pool, name, Some(id))
            .await
            .map_err(internal)?
    {
        return Err(name_exists(name));
    }
    category.name = name.to_string();
    category.description = req.description;
    category.is_active = req.is_active;
    category.sort_order = req.sort_order;

    let (stored, replaced) = match form.image.take() {
        Some(file) => {
            let pic = upload::store_image(&state, file, IMAGE_FOLDER).await?;
            category.pic_url = Some(pic.url);
            let replaced = category.pic_id.replace(pic.public_id.clone());
            (Some(pic.public_id), replaced)
        }
        None => (None, None),
    };

    let written = db::category::update(&state.pool, &category, now()).await;
    let category = settle_image_write(
        state.storage.as_ref(),
        written,
        stored.as_deref(),
        replaced.as_deref(),
    )
    .await?;

    tracing::info!(category_id = id, "Category updated");
    Ok(Json(ItemResponse::with_message(category, "Category updated successfully")))
}

/// PATCH /api/categories/{id}/toggle-status
pub async fn toggle_status(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ItemResponse<Category>> {
    user.require_role(Role::Admin)?;
    let category = db::category::toggle_active(&state.pool, id, now())
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::category_not_found(id))?;
    tracing::info!(category_id = id, is_active = category.is_active, "Category status toggled");
    Ok(Json(ItemResponse::with_message(category, "Category status updated successfully")))
}

/// DELETE /api/categories/{id} - deactivates and drops the image
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    user.require_role(Role::Admin)?;
    let category = find(&state, id).await?;

    let written = db::category::deactivate(&state.pool, id, now()).await;
    settle_image_write(state.storage.as_ref(), written, None, category.pic_id.as_deref()).await?;

    tracing::info!(category_id = id, "Category deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/categories/count - bare number
pub async fn count(State(state): State<AppState>) -> ApiResult<i64> {
    let count = db::category::count_active(&state.pool)
        .await
        .map_err(internal)?;
    Ok(Json(count))
}

/// GET /api/categories/info
pub async fn info(State(state): State<AppState>) -> ApiResult<CategoryServiceInfo> {
    let count = db::category::count_active(&state.pool)
        .await
        .map_err(internal)?;
    Ok(Json(CategoryServiceInfo::active(count)))
}

/// GET /api/categories/health
pub async fn health() -> &'static str {
    "Categories API is up and running"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;
    use sqlx::PgPool;

    use crate::api::test_support::{
        app_with_pool, body_json, create_category, jpeg, multipart_request, request, send, token,
    };

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_image_replaced_on_update_and_released_on_delete(pool: PgPool) {
        let (app, storage) = app_with_pool(pool);
        let admin = token(1, "ROLE_ADMIN");
        let id = create_category(&app, &admin, "Pizza").await;
        let first = storage.uploaded()[0].clone();
        let uri = format!("/api/categories/{id}");

        // no new image: nothing is released
        let resp = send(
            &app,
            multipart_request(
                Method::PUT,
                &uri,
                &admin,
                &json!({"name": "Pizza", "sortOrder": 2}),
                None,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(storage.deleted().is_empty());

        let resp = send(
            &app,
            multipart_request(Method::PUT, &uri, &admin, &json!({"name": "Pizza"}), Some(jpeg())),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let second = storage.uploaded()[1].clone();
        assert_eq!(storage.deleted(), vec![first.clone()]);

        let resp = send(&app, request(Method::DELETE, &uri, Some(&admin))).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(storage.deleted(), vec![first, second]);

        let json = body_json(send(&app, request(Method::GET, &uri, None)).await).await;
        assert_eq!(json["category"]["isActive"], false);
        assert_eq!(json["category"]["imageUrl"], serde_json::Value::Null);
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_rename_to_taken_name_conflicts(pool: PgPool) {
        let (app, storage) = app_with_pool(pool);
        let admin = token(1, "ROLE_ADMIN");
        create_category(&app, &admin, "Pizza").await;
        let id = create_category(&app, &admin, "Sushi").await;

        let resp = send(
            &app,
            multipart_request(
                Method::PUT,
                &format!("/api/categories/{id}"),
                &admin,
                &json!({"name": "PIZZA"}),
                None,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::CategoryNameExists.code());
        assert!(storage.deleted().is_empty());
    }
}
