//! Product CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, map_unique_violation, normalize_limit, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    id: i64,
    name: String,
    brand_id: Option<i64>,
    brand_name: Option<String>,
    brand_image_url: Option<String>,
    price: Option<Decimal>,
    description: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    image_url: Option<String>,
    attributes: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<catalog_db::ProductWithBrandRow> for ProductItem {
    fn from(row: catalog_db::ProductWithBrandRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand_id: row.brand_id,
            brand_name: row.brand_name,
            brand_image_url: row.brand_image_url,
            price: row.price,
            description: row.description,
            category: row.category,
            subcategory: row.subcategory,
            image_url: row.image_url,
            attributes: row.attributes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The bare product row, without joined brand fields; returned by writes.
#[derive(Debug, Serialize)]
pub(super) struct ProductRowItem {
    id: i64,
    name: String,
    brand_id: Option<i64>,
    price: Option<Decimal>,
    description: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    image_url: Option<String>,
    attributes: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<catalog_db::ProductRow> for ProductRowItem {
    fn from(row: catalog_db::ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand_id: row.brand_id,
            price: row.price,
            description: row.description,
            category: row.category,
            subcategory: row.subcategory,
            image_url: row.image_url,
            attributes: row.attributes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub brand_id: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductRequest {
    pub name: String,
    pub brand_id: Option<i64>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
    pub attributes: Option<serde_json::Value>,
}

// Option<Option<T>> is intentional: outer None = "not in request" (keep current),
// Some(None) = "explicitly cleared", Some(Some(v)) = "set to value" (PATCH semantics).
#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub brand_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub subcategory: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub image_url: Option<Option<String>>,
    pub attributes: Option<serde_json::Value>,
}

fn validate_name(req_id: &str, name: &str) -> Result<(), ApiError> {
    if name.is_empty() || name.len() > 200 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "name must be 1–200 characters",
        ));
    }
    Ok(())
}

fn validate_price(req_id: &str, price: f64) -> Result<(), ApiError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::new(
            req_id,
            "validation_error",
            format!("price must be a non-negative number, got {price}"),
        ))
    }
}

/// GET /api/v1/products — products with joined brand fields, ordered by name.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<ProductItem>>>, ApiError> {
    let rows = catalog_db::list_products(
        &state.pool,
        catalog_db::ProductListFilters {
            brand_id: query.brand_id,
            limit: Some(normalize_limit(query.limit)),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ProductItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/products — create a new product.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductRowItem>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim().to_owned();
    validate_name(rid, &name)?;
    if let Some(price) = body.price {
        validate_price(rid, price)?;
    }

    let attributes = body.attributes.unwrap_or_else(|| serde_json::json!({}));
    let row = catalog_db::create_product(
        &state.pool,
        &name,
        body.brand_id,
        body.price,
        body.description.as_deref(),
        body.category.as_deref(),
        body.subcategory.as_deref(),
        body.image_url.as_deref(),
        &attributes,
    )
    .await
    .map_err(|e| map_unique_violation(rid, "product", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ProductRowItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PATCH /api/v1/products/:id — update product fields (sparse).
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductRowItem>>, ApiError> {
    let rid = &req_id.0;

    let trimmed_name = body.name.as_ref().map(|n| n.trim().to_owned());
    if let Some(ref name) = trimmed_name {
        validate_name(rid, name)?;
    }
    if let Some(Some(price)) = body.price {
        validate_price(rid, price)?;
    }

    let row = catalog_db::update_product(
        &state.pool,
        id,
        trimmed_name.as_deref(),
        body.brand_id,
        body.price,
        body.description.as_ref().map(|opt| opt.as_deref()),
        body.category.as_ref().map(|opt| opt.as_deref()),
        body.subcategory.as_ref().map(|opt| opt.as_deref()),
        body.image_url.as_ref().map(|opt| opt.as_deref()),
        body.attributes.as_ref(),
    )
    .await
    .map_err(|e| match e {
        catalog_db::DbError::NotFound => {
            ApiError::new(rid, "not_found", format!("no product with id {id}"))
        }
        other => map_unique_violation(rid, "product", &other),
    })?;

    Ok(Json(ApiResponse {
        data: ProductRowItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/products/:id.
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;

    let deleted = catalog_db::delete_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("no product with id {id}"),
        ));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
