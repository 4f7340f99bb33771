//! Product API Handlers

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{Product, ProductBrief, ProductCreate, ProductResponse, ProductUpdate};
use shared::response::{ItemResponse, ListResponse, PageQuery, PageResponse, Slice};

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::upload::{self, UploadedFile, read_form, settle_image_write};
use crate::api::{ApiResult, internal, now, owned_store};
use crate::auth::{CurrentUser, Role};
use crate::db;
use crate::error::ServiceResult;
use crate::services::StoredImage;
use crate::state::AppState;
use crate::validation;

const IMAGE_FOLDER: &str = "products";
const DEFAULT_PRODUCT_IMAGE_URL: &str =
    "https://via.placeholder.com/400x400/f0f0f0/999999?text=No+Image";

fn default_image() -> StoredImage {
    StoredImage {
        url: DEFAULT_PRODUCT_IMAGE_URL.to_string(),
        public_id: format!("default_product_{}", now()),
    }
}

type Created = (StatusCode, Json<ItemResponse<ProductResponse>>);

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    name: String,
    page: Option<u32>,
    size: Option<u32>,
}

/// POST /api/products - multipart `data` + required `image`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Created, AppError> {
    let owner_id = user.require_role_user(Role::Business)?;
    let mut form = read_form(multipart, state.config.max_file_size).await?;
    let image = form.require_image("Product image is required")?;
    let req: ProductCreate = form.json()?;
    create_product(&state, owner_id, req, Some(image)).await
}

/// POST /api/products/simple - JSON body, default image
pub async fn create_simple(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(req): AppJson<ProductCreate>,
) -> Result<Created, AppError> {
    let owner_id = user.require_role_user(Role::Business)?;
    create_product(&state, owner_id, req, None).await
}

async fn create_product(
    state: &AppState,
    owner_id: i64,
    req: ProductCreate,
    image: Option<UploadedFile>,
) -> Result<Created, AppError> {
    validation::validate_product_create(&req)?;
    owned_store(state, req.store_id, owner_id).await?;
    db::category::find_by_id(&state.pool, req.category_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::category_not_found(req.category_id))?;

    let pic = match image {
        Some(file) => upload::store_image(state, file, IMAGE_FOLDER).await?,
        None => default_image(),
    };

    let written = db::product::insert(&state.pool, &req, &pic, now()).await;
    let product =
        settle_image_write(state.storage.as_ref(), written, Some(&pic.public_id), None).await?;

    tracing::info!(product_id = product.id, store_id = product.store_id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse::with_message(
            ProductResponse::from(product),
            "Product created successfully",
        )),
    ))
}

/// Product plus the store ownership check shared by the write routes
async fn owned_product(state: &AppState, id: i64, owner_id: i64) -> ServiceResult<Product> {
    let product = db::product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))?;
    owned_store(state, product.store_id, owner_id).await?;
    Ok(product)
}

/// PUT /api/products/{id} - multipart `data` + optional `image`
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
    multipart: Multipart,
) -> ApiResult<ItemResponse<ProductResponse>> {
    let owner_id = user.require_role_user(Role::Business)?;
    let mut form = read_form(multipart, state.config.max_file_size).await?;
    let req: ProductUpdate = form.json()?;
    validation::validate_product_update(&req)?;

    let mut product = owned_product(&state, id, owner_id).await?;

    if let Some(name) = req.name {
        product.name = name.trim().to_string();
    }
    if req.description.is_some() {
        product.description = req.description;
    }
    if let Some(price) = req.price {
        product.price = price;
    }
    if req.discount_price.is_some() {
        product.discount_price = req.discount_price;
    }
    if let Some(available) = req.is_available {
        product.is_available = available;
    }
    if let Some(popular) = req.is_popular {
        product.is_popular = popular;
    }

    let (stored, replaced) = match form.image.take() {
        Some(file) => {
            let pic = upload::store_image(&state, file, IMAGE_FOLDER).await?;
            product.pic_url = pic.url;
            let replaced = product.pic_id.replace(pic.public_id.clone());
            (Some(pic.public_id), replaced)
        }
        None => (None, None),
    };

    let written = db::product::update(&state.pool, &product, now()).await;
    let product = settle_image_write(
        state.storage.as_ref(),
        written,
        stored.as_deref(),
        replaced.as_deref(),
    )
    .await?;

    tracing::info!(product_id = id, "Product updated");
    Ok(Json(ItemResponse::with_message(
        ProductResponse::from(product),
        "Product updated successfully",
    )))
}

/// DELETE /api/products/{id} - marks the product unavailable
pub async fn soft_delete(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    let owner_id = user.require_role_user(Role::Business)?;
    owned_product(&state, id, owner_id).await?;
    db::product::set_available(&state.pool, id, false, now())
        .await
        .map_err(internal)?;
    tracing::info!(product_id = id, "Product marked unavailable");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/products/{id}/hard - admin only, removes row and image
pub async fn hard_delete(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    user.require_role(Role::Admin)?;
    let product = db::product::find_by_id(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::product_not_found(id))?;

    let written = db::product::delete(&state.pool, id).await;
    settle_image_write(state.storage.as_ref(), written, None, product.pic_id.as_deref()).await?;

    tracing::info!(product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn page_response(rows: Vec<Product>, page: &PageQuery) -> PageResponse<ProductResponse> {
    PageResponse::new(Slice::from_probe(rows, page).map(ProductResponse::from))
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<PageResponse<ProductResponse>> {
    let rows = db::product::list_available(&state.pool, page.probe_limit(), page.offset())
        .await
        .map_err(internal)?;
    Ok(Json(page_response(rows, &page)))
}

/// GET /api/products/store/{store_id}
pub async fn by_store(
    State(state): State<AppState>,
    AppPath(store_id): AppPath<i64>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<PageResponse<ProductResponse>> {
    let rows = db::product::list_by_store(&state.pool, store_id, page.probe_limit(), page.offset())
        .await
        .map_err(internal)?;
    Ok(Json(page_response(rows, &page)))
}

/// GET /api/products/category/{category_id}
pub async fn by_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<i64>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<PageResponse<ProductResponse>> {
    let rows = db::product::list_by_category(
        &state.pool,
        category_id,
        page.probe_limit(),
        page.offset(),
    )
    .await
    .map_err(internal)?;
    Ok(Json(page_response(rows, &page)))
}

/// GET /api/products/search?name=
pub async fn search(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> ApiResult<PageResponse<ProductResponse>> {
    let term = validation::search_term(&query.name)?;
    let page = PageQuery {
        page: query.page,
        size: query.size,
    };
    let rows = db::product::search_available(&state.pool, &term, page.probe_limit(), page.offset())
        .await
        .map_err(internal)?;
    Ok(Json(page_response(rows, &page)))
}

/// GET /api/products/store/{store_id}/brief
pub async fn brief_by_store(
    State(state): State<AppState>,
    AppPath(store_id): AppPath<i64>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<PageResponse<ProductBrief>> {
    let rows = db::product::list_brief_by_store(
        &state.pool,
        store_id,
        page.probe_limit(),
        page.offset(),
    )
    .await
    .map_err(internal)?;
    Ok(Json(PageResponse::new(Slice::from_probe(rows, &page))))
}

/// GET /api/products/store/{store_id}/popular
pub async fn popular(
    State(state): State<AppState>,
    AppPath(store_id): AppPath<i64>,
) -> ApiResult<ListResponse<ProductResponse>> {
    let rows = db::product::list_popular_by_store(&state.pool, store_id)
        .await
        .map_err(internal)?;
    Ok(Json(ListResponse::new(
        rows.into_iter().map(ProductResponse::from).collect(),
    )))
}

/// GET /api/products/{id} - available only
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ItemResponse<ProductResponse>> {
    let product = db::product::find_available(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::product_not_found(id))?;
    Ok(Json(ItemResponse::new(ProductResponse::from(product))))
}

/// GET /api/products/health
pub async fn health() -> &'static str {
    "Products API is up and running"
}
