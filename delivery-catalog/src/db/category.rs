//! Category database operations

use shared::models::{Category, CategoryBrief, CategoryPayload, CategoryStat};
use sqlx::PgPool;

use super::{BoxError, like_pattern};

pub async fn insert(
    pool: &PgPool,
    req: &CategoryPayload,
    pic_url: Option<&str>,
    pic_id: Option<&str>,
    now: i64,
) -> Result<Category, BoxError> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description, pic_url, pic_id, is_active, sort_order, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING *
        "#,
    )
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(pic_url)
    .bind(pic_id)
    .bind(req.is_active)
    .bind(req.sort_order)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(category)
}

/// Write the mutable columns of an already merged category
pub async fn update(pool: &PgPool, category: &Category, now: i64) -> Result<Category, BoxError> {
    let updated = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories SET
            name = $2, description = $3, pic_url = $4, pic_id = $5,
            is_active = $6, sort_order = $7, updated_at = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.description)
    .bind(&category.pic_url)
    .bind(&category.pic_id)
    .bind(category.is_active)
    .bind(category.sort_order)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(updated)
}

/// Flip `is_active`, `None` when the category does not exist
pub async fn toggle_active(pool: &PgPool, id: i64, now: i64) -> Result<Option<Category>, BoxError> {
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET is_active = NOT is_active, updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

/// Soft delete that also clears the picture columns; the caller releases the image
pub async fn deactivate(pool: &PgPool, id: i64, now: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query(
        r#"
        UPDATE categories
        SET is_active = FALSE, pic_url = NULL, pic_id = NULL, updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Category>, BoxError> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn find_brief(pool: &PgPool, id: i64) -> Result<Option<CategoryBrief>, BoxError> {
    let brief = sqlx::query_as::<_, CategoryBrief>(
        "SELECT id, name, is_active, sort_order FROM categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(brief)
}

pub async fn active_name_taken(
    pool: &PgPool,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, BoxError> {
    let (taken,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM categories
            WHERE is_active AND LOWER(name) = LOWER($1)
              AND ($2::BIGINT IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(name.trim())
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<Category>, BoxError> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE is_active ORDER BY sort_order, name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_brief_active(pool: &PgPool) -> Result<Vec<CategoryBrief>, BoxError> {
    let rows = sqlx::query_as::<_, CategoryBrief>(
        "SELECT id, name, is_active, sort_order FROM categories WHERE is_active ORDER BY sort_order, name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Any status; unknown ids are skipped
pub async fn list_brief_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<CategoryBrief>, BoxError> {
    let rows = sqlx::query_as::<_, CategoryBrief>(
        r#"
        SELECT id, name, is_active, sort_order
        FROM categories
        WHERE id = ANY($1)
        ORDER BY sort_order, name
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn search_active(pool: &PgPool, term: &str) -> Result<Vec<Category>, BoxError> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE is_active AND name ILIKE $1 ORDER BY sort_order, name",
    )
    .bind(like_pattern(term))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn stats(pool: &PgPool) -> Result<Vec<CategoryStat>, BoxError> {
    let rows = sqlx::query_as::<_, CategoryStat>(
        r#"
        SELECT is_active, COUNT(*) AS count
        FROM categories
        GROUP BY is_active
        ORDER BY is_active DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_active(pool: &PgPool) -> Result<i64, BoxError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE is_active")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
