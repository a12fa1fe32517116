//! Database operations for the `brands` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all brands, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, image_url, created_at, updated_at \
         FROM brands \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single brand by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand(pool: &PgPool, brand_id: i64) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, image_url, created_at, updated_at \
         FROM brands \
         WHERE id = $1",
    )
    .bind(brand_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new brand row and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including unique constraint
/// violations on `name`).
pub async fn create_brand(
    pool: &PgPool,
    name: &str,
    image_url: Option<&str>,
) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "INSERT INTO brands (name, image_url) \
         VALUES ($1, $2) \
         RETURNING id, name, image_url, created_at, updated_at",
    )
    .bind(name)
    .bind(image_url)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Resolves a brand name to its id, creating the row if absent.
///
/// Single atomic `INSERT ... ON CONFLICT ... RETURNING` round-trip: the
/// conflict arm is a no-op update of `name` to itself so that `RETURNING id`
/// always yields a row, whether it was inserted or already existed. Two
/// imports supplying the same name therefore resolve to the same id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_brand_by_name(pool: &PgPool, name: &str) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO brands (name) \
         VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Updates metadata fields for an existing brand.
///
/// `name: Some(v)` overwrites, `None` preserves. `image_url` follows PATCH
/// semantics: outer `None` preserves, `Some(None)` clears, `Some(Some(v))`
/// sets.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand with `brand_id` exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_brand(
    pool: &PgPool,
    brand_id: i64,
    name: Option<&str>,
    image_url: Option<Option<&str>>,
) -> Result<BrandRow, DbError> {
    let image_url_supplied = image_url.is_some();
    let image_url_val = image_url.flatten();

    let row = sqlx::query_as::<_, BrandRow>(
        "UPDATE brands \
         SET name       = COALESCE($2, name), \
             image_url  = CASE WHEN $3::BOOL THEN $4 ELSE image_url END, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, name, image_url, created_at, updated_at",
    )
    .bind(brand_id)
    .bind(name)
    .bind(image_url_supplied)
    .bind(image_url_val)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a brand. Products referencing it keep a `NULL` brand via the
/// `ON DELETE SET NULL` foreign key.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_brand(pool: &PgPool, brand_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(brand_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
