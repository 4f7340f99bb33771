//! Product database operations

use shared::models::{Product, ProductBrief, ProductCreate};
use sqlx::PgPool;

use super::{BoxError, like_pattern};
use crate::services::StoredImage;

pub async fn insert(
    pool: &PgPool,
    req: &ProductCreate,
    pic: &StoredImage,
    now: i64,
) -> Result<Product, BoxError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (
            store_id, category_id, name, description, price, discount_price,
            pic_url, pic_id, is_popular, is_available, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING *
        "#,
    )
    .bind(req.store_id)
    .bind(req.category_id)
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(req.price)
    .bind(req.discount_price)
    .bind(&pic.url)
    .bind(&pic.public_id)
    .bind(req.is_popular)
    .bind(req.is_available)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

/// Write the mutable columns of an already merged product
pub async fn update(pool: &PgPool, product: &Product, now: i64) -> Result<Product, BoxError> {
    let updated = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products SET
            name = $2, description = $3, price = $4, discount_price = $5,
            pic_url = $6, pic_id = $7, is_popular = $8, is_available = $9,
            updated_at = $10
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.discount_price)
    .bind(&product.pic_url)
    .bind(&product.pic_id)
    .bind(product.is_popular)
    .bind(product.is_available)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(updated)
}

pub async fn set_available(
    pool: &PgPool,
    id: i64,
    available: bool,
    now: i64,
) -> Result<bool, BoxError> {
    let rows = sqlx::query("UPDATE products SET is_available = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(available)
        .bind(now)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

/// Any availability
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Product>, BoxError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn find_available(pool: &PgPool, id: i64) -> Result<Option<Product>, BoxError> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND is_available")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(product)
}

pub async fn list_available(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE is_available
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_by_store(
    pool: &PgPool,
    store_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE store_id = $1 AND is_available
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(store_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_by_category(
    pool: &PgPool,
    category_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE category_id = $1 AND is_available
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(category_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn search_available(
    pool: &PgPool,
    term: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE is_available AND name ILIKE $1
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

/// Menu rows of one store
pub async fn list_brief_by_store(
    pool: &PgPool,
    store_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ProductBrief>, BoxError> {
    let rows = sqlx::query_as::<_, ProductBrief>(
        r#"
        SELECT id, name, price, discount_price, pic_url, is_available, rating
        FROM products
        WHERE store_id = $1 AND is_available
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(store_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_popular_by_store(pool: &PgPool, store_id: i64) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE store_id = $1 AND is_available AND is_popular
        ORDER BY rating DESC, created_at DESC
        "#,
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
