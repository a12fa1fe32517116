//! Brand CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, map_unique_violation, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct BrandItem {
    id: i64,
    name: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<catalog_db::BrandRow> for BrandItem {
    fn from(row: catalog_db::BrandRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateBrandRequest {
    pub name: String,
    pub image_url: Option<String>,
}

// Option<Option<T>> is intentional: outer None = "not in request" (keep current),
// Some(None) = "explicitly cleared", Some(Some(v)) = "set to value" (PATCH semantics).
#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateBrandRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub image_url: Option<Option<String>>,
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

/// GET /api/v1/brands — all brands, ordered by name.
pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<BrandItem>>>, ApiError> {
    let rows = catalog_db::list_brands(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(BrandItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/brands — create a new brand.
pub(super) async fn create_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateBrandRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BrandItem>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim().to_owned();
    validate_name(rid, &name)?;

    let row = catalog_db::create_brand(&state.pool, &name, body.image_url.as_deref())
        .await
        .map_err(|e| map_unique_violation(rid, "brand", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: BrandItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PATCH /api/v1/brands/:id — update brand metadata (sparse).
pub(super) async fn update_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBrandRequest>,
) -> Result<Json<ApiResponse<BrandItem>>, ApiError> {
    let rid = &req_id.0;

    let trimmed_name = body.name.as_ref().map(|n| n.trim().to_owned());
    if let Some(ref name) = trimmed_name {
        validate_name(rid, name)?;
    }

    let row = catalog_db::update_brand(
        &state.pool,
        id,
        trimmed_name.as_deref(),
        body.image_url.as_ref().map(|opt| opt.as_deref()),
    )
    .await
    .map_err(|e| match e {
        catalog_db::DbError::NotFound => {
            ApiError::new(rid, "not_found", format!("no brand with id {id}"))
        }
        other => map_unique_violation(rid, "brand", &other),
    })?;

    Ok(Json(ApiResponse {
        data: BrandItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/brands/:id — delete a brand; its products keep a NULL brand.
pub(super) async fn delete_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;

    let deleted = catalog_db::delete_brand(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("no brand with id {id}"),
        ));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
