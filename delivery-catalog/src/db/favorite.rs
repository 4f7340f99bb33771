//! Favorite store database operations

use rust_decimal::Decimal;
use shared::models::{Favorite, FavoriteStoreSummary};
use sqlx::PgPool;

use super::BoxError;

/// `favorite_stores` joined with the store summary
#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    id: i64,
    user_id: i64,
    created_at: i64,
    store_id: i64,
    store_name: String,
    store_description: Option<String>,
    store_pic_url: String,
    store_is_active: bool,
    store_rating: Decimal,
    store_delivery_radius: Option<i32>,
    store_estimated_delivery_time: Option<i32>,
    store_created_at: i64,
    store_updated_at: i64,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            store: FavoriteStoreSummary {
                id: row.store_id,
                name: row.store_name,
                description: row.store_description,
                pic_url: row.store_pic_url,
                is_active: row.store_is_active,
                rating: row.store_rating,
                delivery_radius: row.store_delivery_radius,
                estimated_delivery_time: row.store_estimated_delivery_time,
                created_at: row.store_created_at,
                updated_at: row.store_updated_at,
            },
        }
    }
}

const FAVORITE_SELECT: &str = r#"
    SELECT f.id, f.user_id, f.created_at,
           s.id AS store_id, s.name AS store_name, s.description AS store_description,
           s.pic_url AS store_pic_url, s.is_active AS store_is_active, s.rating AS store_rating,
           s.delivery_radius AS store_delivery_radius,
           s.estimated_delivery_time AS store_estimated_delivery_time,
           s.created_at AS store_created_at, s.updated_at AS store_updated_at
    FROM favorite_stores f
    JOIN stores s ON s.id = f.store_id
"#;

/// Newest first; `active_only` drops favorites of deactivated stores
pub async fn list_by_user(
    pool: &PgPool,
    user_id: i64,
    active_only: bool,
) -> Result<Vec<Favorite>, BoxError> {
    let sql = format!(
        "{FAVORITE_SELECT} WHERE f.user_id = $1 AND (NOT $2 OR s.is_active) ORDER BY f.created_at DESC, f.id DESC"
    );
    let rows = sqlx::query_as::<_, FavoriteRow>(&sql)
        .bind(user_id)
        .bind(active_only)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Favorite::from).collect())
}

pub async fn find(pool: &PgPool, user_id: i64, store_id: i64) -> Result<Option<Favorite>, BoxError> {
    let sql = format!("{FAVORITE_SELECT} WHERE f.user_id = $1 AND f.store_id = $2");
    let row = sqlx::query_as::<_, FavoriteRow>(&sql)
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Favorite::from))
}

pub async fn exists(pool: &PgPool, user_id: i64, store_id: i64) -> Result<bool, BoxError> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM favorite_stores WHERE user_id = $1 AND store_id = $2)",
    )
    .bind(user_id)
    .bind(store_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// `false` when the pair already exists
pub async fn insert(pool: &PgPool, user_id: i64, store_id: i64, now: i64) -> Result<bool, BoxError> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO favorite_stores (user_id, store_id, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, store_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(store_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn delete(pool: &PgPool, user_id: i64, store_id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM favorite_stores WHERE user_id = $1 AND store_id = $2")
        .bind(user_id)
        .bind(store_id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn count_by_user(pool: &PgPool, user_id: i64) -> Result<i64, BoxError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorite_stores WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_by_store(pool: &PgPool, store_id: i64) -> Result<i64, BoxError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM favorite_stores WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
