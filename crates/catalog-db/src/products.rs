//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    /// Nullable: a product whose source row omitted a brand, or whose brand
    /// was deleted, carries no reference.
    pub brand_id: Option<i64>,
    pub name: String,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
    /// Open-ended attribute map (`JSONB`, defaults to `{}`).
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its brand's display fields, for list views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductWithBrandRow {
    pub id: i64,
    pub brand_id: Option<i64>,
    pub name: String,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub brand_name: Option<String>,
    pub brand_image_url: Option<String>,
}

/// One product destined for the bulk upsert, with its brand already resolved.
///
/// `price` is a plain `f64` at this boundary; the SQL statement casts it to
/// the `NUMERIC(10,2)` column, so values are rounded to two decimal places at
/// write time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInsert {
    pub name: String,
    pub brand_id: Option<i64>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
}

/// Filters for [`list_products`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductListFilters {
    pub brand_id: Option<i64>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns products with their joined brand fields, ordered by name.
///
/// A `NULL` limit means no limit.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: ProductListFilters,
) -> Result<Vec<ProductWithBrandRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductWithBrandRow>(
        "SELECT p.id, p.brand_id, p.name, p.price, p.description, p.category, \
                p.subcategory, p.image_url, p.attributes, p.created_at, p.updated_at, \
                b.name AS brand_name, b.image_url AS brand_image_url \
         FROM products p \
         LEFT JOIN brands b ON b.id = p.brand_id \
         WHERE ($1::INT8 IS NULL OR p.brand_id = $1) \
         ORDER BY p.name \
         LIMIT $2",
    )
    .bind(filters.brand_id)
    .bind(filters.limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single product by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, product_id: i64) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, brand_id, name, price, description, category, subcategory, \
                image_url, attributes, created_at, updated_at \
         FROM products \
         WHERE id = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new product row and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including unique constraint
/// violations on `name`).
#[allow(clippy::too_many_arguments)] // public API for full product creation; no sensible grouping
pub async fn create_product(
    pool: &PgPool,
    name: &str,
    brand_id: Option<i64>,
    price: Option<f64>,
    description: Option<&str>,
    category: Option<&str>,
    subcategory: Option<&str>,
    image_url: Option<&str>,
    attributes: &serde_json::Value,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products \
             (name, brand_id, price, description, category, subcategory, image_url, attributes) \
         VALUES ($1, $2, $3::numeric(10,2), $4, $5, $6, $7, $8::jsonb) \
         RETURNING id, brand_id, name, price, description, category, subcategory, \
                   image_url, attributes, created_at, updated_at",
    )
    .bind(name)
    .bind(brand_id)
    .bind(price)
    .bind(description)
    .bind(category)
    .bind(subcategory)
    .bind(image_url)
    .bind(attributes)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Upserts a batch of products in one statement, keyed on `name`.
///
/// Existing rows with matching names are updated in place; absent rows are
/// inserted. The statement either applies the whole batch or fails; there is
/// no partial write and no retry. `attributes` is left out of the conflict
/// update so imports never clobber manually-edited attribute maps.
///
/// Callers must deduplicate `records` by name first: Postgres rejects an
/// `ON CONFLICT DO UPDATE` that touches the same row twice in one command.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn bulk_upsert_products(
    pool: &PgPool,
    records: &[ProductInsert],
) -> Result<u64, DbError> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut names = Vec::with_capacity(records.len());
    let mut brand_ids = Vec::with_capacity(records.len());
    let mut prices = Vec::with_capacity(records.len());
    let mut descriptions = Vec::with_capacity(records.len());
    let mut categories = Vec::with_capacity(records.len());
    let mut subcategories = Vec::with_capacity(records.len());
    let mut image_urls = Vec::with_capacity(records.len());

    for record in records {
        names.push(record.name.clone());
        brand_ids.push(record.brand_id);
        prices.push(record.price);
        descriptions.push(record.description.clone());
        categories.push(record.category.clone());
        subcategories.push(record.subcategory.clone());
        image_urls.push(record.image_url.clone());
    }

    let rows_affected = sqlx::query(
        "INSERT INTO products \
             (name, brand_id, price, description, category, subcategory, image_url) \
         SELECT name, brand_id, price::numeric(10,2), description, category, subcategory, image_url \
         FROM UNNEST($1::TEXT[], $2::INT8[], $3::FLOAT8[], $4::TEXT[], $5::TEXT[], $6::TEXT[], $7::TEXT[]) \
             AS t(name, brand_id, price, description, category, subcategory, image_url) \
         ON CONFLICT (name) DO UPDATE SET \
             brand_id    = EXCLUDED.brand_id, \
             price       = EXCLUDED.price, \
             description = EXCLUDED.description, \
             category    = EXCLUDED.category, \
             subcategory = EXCLUDED.subcategory, \
             image_url   = EXCLUDED.image_url, \
             updated_at  = NOW()",
    )
    .bind(&names)
    .bind(&brand_ids)
    .bind(&prices)
    .bind(&descriptions)
    .bind(&categories)
    .bind(&subcategories)
    .bind(&image_urls)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected)
}

/// Updates fields of an existing product.
///
/// `name: Some(v)` overwrites, `None` preserves. All nullable columns follow
/// PATCH semantics: outer `None` preserves, `Some(None)` clears,
/// `Some(Some(v))` sets.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product with `product_id` exists, or
/// [`DbError::Sqlx`] if the query fails.
#[allow(clippy::too_many_arguments)] // public API for partial product update; no sensible grouping
pub async fn update_product(
    pool: &PgPool,
    product_id: i64,
    name: Option<&str>,
    brand_id: Option<Option<i64>>,
    price: Option<Option<f64>>,
    description: Option<Option<&str>>,
    category: Option<Option<&str>>,
    subcategory: Option<Option<&str>>,
    image_url: Option<Option<&str>>,
    attributes: Option<&serde_json::Value>,
) -> Result<ProductRow, DbError> {
    // For nullable columns (Option<Option<T>>), distinguish:
    //   - None        => keep existing value
    //   - Some(None)  => set to NULL
    //   - Some(value) => set to value
    // A bool flag indicates "was supplied" alongside the value itself.
    let brand_id_supplied = brand_id.is_some();
    let brand_id_val = brand_id.flatten();
    let price_supplied = price.is_some();
    let price_val = price.flatten();
    let description_supplied = description.is_some();
    let description_val = description.flatten();
    let category_supplied = category.is_some();
    let category_val = category.flatten();
    let subcategory_supplied = subcategory.is_some();
    let subcategory_val = subcategory.flatten();
    let image_url_supplied = image_url.is_some();
    let image_url_val = image_url.flatten();

    let row = sqlx::query_as::<_, ProductRow>(
        "UPDATE products \
         SET name        = COALESCE($2, name), \
             brand_id    = CASE WHEN $3::BOOL  THEN $4 ELSE brand_id END, \
             price       = CASE WHEN $5::BOOL  THEN $6::numeric(10,2) ELSE price END, \
             description = CASE WHEN $7::BOOL  THEN $8 ELSE description END, \
             category    = CASE WHEN $9::BOOL  THEN $10 ELSE category END, \
             subcategory = CASE WHEN $11::BOOL THEN $12 ELSE subcategory END, \
             image_url   = CASE WHEN $13::BOOL THEN $14 ELSE image_url END, \
             attributes  = COALESCE($15::jsonb, attributes), \
             updated_at  = NOW() \
         WHERE id = $1 \
         RETURNING id, brand_id, name, price, description, category, subcategory, \
                   image_url, attributes, created_at, updated_at",
    )
    .bind(product_id)
    .bind(name)
    .bind(brand_id_supplied)
    .bind(brand_id_val)
    .bind(price_supplied)
    .bind(price_val)
    .bind(description_supplied)
    .bind(description_val)
    .bind(category_supplied)
    .bind(category_val)
    .bind(subcategory_supplied)
    .bind(subcategory_val)
    .bind(image_url_supplied)
    .bind(image_url_val)
    .bind(attributes)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a product.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_product(pool: &PgPool, product_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
