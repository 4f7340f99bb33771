//! Store API Handlers

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    NearbyStore, NearbyStoreQuery, Store, StoreBrief, StoreCreate, StoreUi, StoreUpdate,
};
use shared::response::{ItemResponse, ListResponse, PageQuery, PageResponse, Slice};

use super::nearby;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::upload::{self, read_form, settle_image_write};
use crate::api::{ApiResult, ensure_owner, internal, now};
use crate::auth::{CurrentUser, Role};
use crate::db;
use crate::services::StoredImage;
use crate::state::AppState;
use crate::validation;

const IMAGE_FOLDER: &str = "stores";
const UI_LIMIT: i64 = 6;
const DEFAULT_STORE_IMAGE_URL: &str =
    "https://via.placeholder.com/800x600/f0f0f0/999999?text=Store+Image";

fn default_image(owner_id: i64) -> StoredImage {
    StoredImage {
        url: DEFAULT_STORE_IMAGE_URL.to_string(),
        public_id: format!("default_store_{}_{owner_id}", now()),
    }
}

fn name_exists(name: &str) -> AppError {
    AppError::with_message(
        ErrorCode::StoreNameExists,
        format!("Store with name '{}' already exists", name.trim()),
    )
}

/// Renames (ignoring case) and reactivations must re-check the name
fn needs_name_check(previous_name: &str, was_active: bool, updated: &Store) -> bool {
    let renamed = !updated.name.eq_ignore_ascii_case(previous_name);
    let reactivated = !was_active && updated.is_active;
    renamed || reactivated
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    name: String,
    page: Option<u32>,
    size: Option<u32>,
}

impl SearchQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            size: self.size,
        }
    }
}

/// POST /api/stores - multipart `data` + optional `image`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ItemResponse<Store>>), AppError> {
    let owner_id = user.require_role_user(Role::Business)?;
    let mut form = read_form(multipart, state.config.max_file_size).await?;
    let req: StoreCreate = form.json()?;
    let image = form.image.take();
    create_store(&state, owner_id, req, image).await
}

/// POST /api/stores/simple - JSON body, default image
pub async fn create_simple(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(req): AppJson<StoreCreate>,
) -> Result<(StatusCode, Json<ItemResponse<Store>>), AppError> {
    let owner_id = user.require_role_user(Role::Business)?;
    create_store(&state, owner_id, req, None).await
}

async fn create_store(
    state: &AppState,
    owner_id: i64,
    req: StoreCreate,
    image: Option<upload::UploadedFile>,
) -> Result<(StatusCode, Json<ItemResponse<Store>>), AppError> {
    validation::validate_store_create(&req)?;

    if db::store::active_name_taken(&state.pool, owner_id, &req.name, None)
        .await
        .map_err(internal)?
    {
        return Err(name_exists(&req.name));
    }

    let address = state.geocoder.resolve_address(req.address.clone()).await;

    let pic = match image {
        Some(file) => upload::store_image(state, file, IMAGE_FOLDER).await?,
        None => default_image(owner_id),
    };

    let written = db::store::insert(&state.pool, owner_id, &req, &address, &pic, now()).await;
    let store =
        settle_image_write(state.storage.as_ref(), written, Some(&pic.public_id), None).await?;

    tracing::info!(store_id = store.id, owner_id, name = %store.name, "Store created");
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse::with_message(store, "Store created successfully")),
    ))
}

/// PUT /api/stores/{id}
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<StoreUpdate>,
) -> ApiResult<ItemResponse<Store>> {
    let owner_id = user.require_role_user(Role::Business)?;
    validation::validate_store_update(&req)?;

    let mut store = db::store::find_by_id(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::store_not_found(id))?;
    ensure_owner(&store, owner_id)?;

    let previous_name = store.name.clone();
    let was_active = store.is_active;
    if let Some(name) = req.name {
        store.name = name.trim().to_string();
    }
    if let Some(address) = req.address {
        store.address = state.geocoder.resolve_address(address).await;
    }
    if req.description.is_some() {
        store.description = req.description;
    }
    if req.phone.is_some() {
        store.phone = req.phone;
    }
    if req.email.is_some() {
        store.email = req.email;
    }
    if req.delivery_radius.is_some() {
        store.delivery_radius = req.delivery_radius;
    }
    if req.delivery_fee.is_some() {
        store.delivery_fee = req.delivery_fee;
    }
    if req.estimated_delivery_time.is_some() {
        store.estimated_delivery_time = req.estimated_delivery_time;
    }
    if let Some(active) = req.is_active {
        store.is_active = active;
    }

    if needs_name_check(&previous_name, was_active, &store)
        && db::store::active_name_taken(&state.pool, owner_id, &store.name, Some(id))
            .await
            .map_err(internal)?
    {
        return Err(name_exists(&store.name));
    }

    let store = db::store::update(&state.pool, &store, now())
        .await
        .map_err(internal)?;
    tracing::info!(store_id = id, "Store updated");
    Ok(Json(ItemResponse::with_message(store, "Store updated successfully")))
}

/// DELETE /api/stores/{id} - soft delete
pub async fn deactivate(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    let owner_id = user.require_role_user(Role::Business)?;
    let store = db::store::find_by_id(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::store_not_found(id))?;
    ensure_owner(&store, owner_id)?;

    db::store::deactivate(&state.pool, id, now())
        .await
        .map_err(internal)?;
    tracing::info!(store_id = id, "Store deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/stores
pub async fn list(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<PageResponse<Store>> {
    let rows = db::store::list_active(&state.pool, page.probe_limit(), page.offset())
        .await
        .map_err(internal)?;
    Ok(Json(PageResponse::new(Slice::from_probe(rows, &page))))
}

/// GET /api/stores/my
pub async fn mine(
    State(state): State<AppState>,
    user: CurrentUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<PageResponse<Store>> {
    let owner_id = user.require_user_id()?;
    let rows = db::store::list_by_owner(&state.pool, owner_id, page.probe_limit(), page.offset())
        .await
        .map_err(internal)?;
    Ok(Json(PageResponse::new(Slice::from_probe(rows, &page))))
}

/// GET /api/stores/owner/{owner_id}
pub async fn by_owner(
    State(state): State<AppState>,
    AppPath(owner_id): AppPath<i64>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<PageResponse<Store>> {
    let rows = db::store::list_by_owner(&state.pool, owner_id, page.probe_limit(), page.offset())
        .await
        .map_err(internal)?;
    Ok(Json(PageResponse::new(Slice::from_probe(rows, &page))))
}

/// GET /api/stores/{id} - active only
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ItemResponse<Store>> {
    let store = db::store::find_active(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::store_not_found(id))?;
    Ok(Json(ItemResponse::new(store)))
}

/// GET /api/stores/ui - home screen cards
pub async fn ui(State(state): State<AppState>) -> ApiResult<ListResponse<StoreUi>> {
    let rows = db::store::list_ui(&state.pool, UI_LIMIT)
        .await
        .map_err(internal)?;
    Ok(Json(ListResponse::new(rows)))
}

/// GET /api/stores/brief
pub async fn brief(State(state): State<AppState>) -> ApiResult<ListResponse<StoreBrief>> {
    let rows = db::store::list_brief(&state.pool).await.map_err(internal)?;
    Ok(Json(ListResponse::new(rows)))
}

/// GET /api/stores/search?name=
pub async fn search(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> ApiResult<PageResponse<Store>> {
    let term = validation::search_term(&query.name)?;
    let page = query.page();
    let rows = db::store::search_active(&state.pool, &term, page.probe_limit(), page.offset())
        .await
        .map_err(internal)?;
    Ok(Json(PageResponse::new(Slice::from_probe(rows, &page))))
}

/// GET /api/stores/nearby
pub async fn nearby(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<NearbyStoreQuery>,
) -> ApiResult<ListResponse<NearbyStore>> {
    validation::validate_nearby(&query)?;
    let candidates = db::store::list_active_with_coordinates(&state.pool)
        .await
        .map_err(internal)?;
    let hits = nearby::rank(candidates, &query);
    tracing::debug!(
        latitude = query.latitude,
        longitude = query.longitude,
        radius_km = query.radius_km,
        found = hits.len(),
        "Nearby search"
    );
    Ok(Json(ListResponse::new(hits)))
}

/// GET /api/stores/health
pub async fn health() -> &'static str {
    "Stores API is up and running"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use rust_decimal::Decimal;
    use serde_json::json;
    use shared::models::Address;
    use sqlx::PgPool;

    use crate::api::test_support::{
        app_with_pool, body_json, create_store, json_request, request, send, token,
    };

    fn store(name: &str, is_active: bool) -> Store {
        Store {
            id: 1,
            owner_id: 10,
            name: name.into(),
            description: None,
            address: Address {
                street: "Sumska 1".into(),
                city: "Kharkiv".into(),
                ..Default::default()
            },
            phone: None,
            email: None,
            is_active,
            rating: Decimal::ZERO,
            delivery_radius: None,
            delivery_fee: None,
            estimated_delivery_time: None,
            pic_url: DEFAULT_STORE_IMAGE_URL.into(),
            pic_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_name_check_on_rename_and_reactivation() {
        // same name, different case
        assert!(!needs_name_check("Pizza Place", true, &store("pizza place", true)));
        assert!(needs_name_check("Pizza Place", true, &store("Pizza Palace", true)));
        // inactive store coming back
        assert!(needs_name_check("Pizza Place", false, &store("Pizza Place", true)));
        assert!(!needs_name_check("Pizza Place", false, &store("Pizza Place", false)));
        assert!(!needs_name_check("Pizza Place", true, &store("Pizza Place", false)));
    }

    #[test]
    fn test_default_image_is_a_placeholder() {
        let pic = default_image(42);
        assert!(pic.public_id.starts_with("default_store_"));
        assert!(pic.public_id.ends_with("_42"));
        assert!(crate::services::storage::is_default_image(&pic.public_id));
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_rename_conflict_ignores_case(pool: PgPool) {
        let (app, _) = app_with_pool(pool);
        let owner = token(30, "ROLE_BUSINESS");
        create_store(&app, &owner, "Pizza Place").await;
        let other = create_store(&app, &owner, "Sushi Bar").await;
        let uri = format!("/api/stores/{other}");

        let resp = send(
            &app,
            json_request(Method::PUT, &uri, Some(&owner), &json!({"name": "  PIZZA place "})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::StoreNameExists.code());

        // a case-only rename of the store itself is allowed
        let resp = send(
            &app,
            json_request(Method::PUT, &uri, Some(&owner), &json!({"name": "SUSHI BAR"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["store"]["name"], "SUSHI BAR");
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_reactivation_rechecks_name(pool: PgPool) {
        let (app, _) = app_with_pool(pool);
        let owner = token(31, "ROLE_BUSINESS");
        let old = create_store(&app, &owner, "Pizza Place").await;
        let uri = format!("/api/stores/{old}");

        let resp = send(&app, request(Method::DELETE, &uri, Some(&owner))).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        create_store(&app, &owner, "pizza place").await;

        let resp = send(
            &app,
            json_request(Method::PUT, &uri, Some(&owner), &json!({"isActive": true})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::StoreNameExists.code());
    }
}
