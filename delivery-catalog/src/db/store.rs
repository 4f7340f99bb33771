//! Store database operations

use shared::models::{Address, Store, StoreBrief, StoreCreate, StoreUi};
use sqlx::PgPool;

use super::{BoxError, like_pattern};
use crate::services::StoredImage;

pub async fn insert(
    pool: &PgPool,
    owner_id: i64,
    req: &StoreCreate,
    address: &Address,
    pic: &StoredImage,
    now: i64,
) -> Result<Store, BoxError> {
    let store = sqlx::query_as::<_, Store>(
        r#"
        INSERT INTO stores (
            owner_id, name, description,
            street, city, region, country, postal_code, latitude, longitude, full_address,
            phone, email, is_active, delivery_radius, delivery_fee, estimated_delivery_time,
            pic_url, pic_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $20)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.region)
    .bind(&address.country)
    .bind(&address.postal_code)
    .bind(address.latitude)
    .bind(address.longitude)
    .bind(&address.full_address)
    .bind(&req.phone)
    .bind(&req.email)
    .bind(req.is_active)
    .bind(req.delivery_radius)
    .bind(req.delivery_fee)
    .bind(req.estimated_delivery_time)
    .bind(&pic.url)
    .bind(&pic.public_id)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(store)
}

/// Write every mutable column of an already merged store
pub async fn update(pool: &PgPool, store: &Store, now: i64) -> Result<Store, BoxError> {
    let address = &store.address;
    let updated = sqlx::query_as::<_, Store>(
        r#"
        UPDATE stores SET
            name = $2, description = $3,
            street = $4, city = $5, region = $6, country = $7, postal_code = $8,
            latitude = $9, longitude = $10, full_address = $11,
            phone = $12, email = $13, is_active = $14,
            delivery_radius = $15, delivery_fee = $16, estimated_delivery_time = $17,
            updated_at = $18
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(store.id)
    .bind(&store.name)
    .bind(&store.description)
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.region)
    .bind(&address.country)
    .bind(&address.postal_code)
    .bind(address.latitude)
    .bind(address.longitude)
    .bind(&address.full_address)
    .bind(&store.phone)
    .bind(&store.email)
    .bind(store.is_active)
    .bind(store.delivery_radius)
    .bind(store.delivery_fee)
    .bind(store.estimated_delivery_time)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(updated)
}

pub async fn deactivate(pool: &PgPool, id: i64, now: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("UPDATE stores SET is_active = FALSE, updated_at = $2 WHERE id = $1")
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

/// Any status
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Store>, BoxError> {
    let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

pub async fn find_active(pool: &PgPool, id: i64) -> Result<Option<Store>, BoxError> {
    let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1 AND is_active")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

/// Another active store of this owner already uses the name (case-insensitive)
pub async fn active_name_taken(
    pool: &PgPool,
    owner_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, BoxError> {
    let (taken,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM stores
            WHERE owner_id = $1 AND is_active AND LOWER(name) = LOWER($2)
              AND ($3::BIGINT IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(owner_id)
    .bind(name.trim())
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

pub async fn list_active(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Store>, BoxError> {
    let rows = sqlx::query_as::<_, Store>(
        "SELECT * FROM stores WHERE is_active ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active and inactive stores of one owner
pub async fn list_by_owner(
    pool: &PgPool,
    owner_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Store>, BoxError> {
    let rows = sqlx::query_as::<_, Store>(
        r#"
        SELECT * FROM stores
        WHERE owner_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn search_active(
    pool: &PgPool,
    term: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Store>, BoxError> {
    let rows = sqlx::query_as::<_, Store>(
        r#"
        SELECT * FROM stores
        WHERE is_active AND name ILIKE $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(like_pattern(term))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Home-screen cards: best rated first
pub async fn list_ui(pool: &PgPool, limit: i64) -> Result<Vec<StoreUi>, BoxError> {
    let rows = sqlx::query_as::<_, StoreUi>(
        r#"
        SELECT id, name, pic_url, rating, estimated_delivery_time
        FROM stores
        WHERE is_active
        ORDER BY rating DESC, created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_brief(pool: &PgPool) -> Result<Vec<StoreBrief>, BoxError> {
    let rows = sqlx::query_as::<_, StoreBrief>(
        r#"
        SELECT id, name, is_active, rating, delivery_fee, estimated_delivery_time, pic_url,
               city AS address_city, street AS address_street
        FROM stores
        WHERE is_active
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Candidates for the nearby search
pub async fn list_active_with_coordinates(pool: &PgPool) -> Result<Vec<Store>, BoxError> {
    let rows = sqlx::query_as::<_, Store>(
        "SELECT * FROM stores WHERE is_active AND latitude IS NOT NULL AND longitude IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
