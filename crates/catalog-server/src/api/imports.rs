//! Import endpoint: submit a spreadsheet (multipart upload or remote URL)
//! and list the audit log.

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::header::CONTENT_TYPE,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ImportData {
    pub success: bool,
    pub imported: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImportUrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ImportLogItem {
    id: i64,
    kind: String,
    file_ref: Option<String>,
    source_url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImportLogQuery {
    pub limit: Option<i64>,
}

fn map_import_error(request_id: &str, error: &catalog_import::ImportError) -> ApiError {
    use catalog_import::ImportError;

    let code = match error {
        ImportError::Fetch(_) | ImportError::UnexpectedStatus { .. } => "fetch_error",
        ImportError::Parse { .. } => "parse_error",
        ImportError::Persistence(_) => "internal_error",
    };
    tracing::error!(error = %error, code, "import failed");
    ApiError::new(request_id, code, error.to_string())
}

/// POST /api/v1/imports — run an import from a multipart `file` part or a
/// JSON `{"url": ...}` body, depending on the request content type.
pub(super) async fn submit_import(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    req: Request,
) -> Result<Json<ApiResponse<ImportData>>, ApiError> {
    let rid = req_id.0.clone();

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let outcome = if content_type.starts_with("multipart/form-data") {
        let bytes = read_uploaded_file(&rid, req).await?;
        catalog_import::import_file_bytes(&state.pool, &bytes).await
    } else {
        let Json(body) = Json::<ImportUrlRequest>::from_request(req, &())
            .await
            .map_err(|e| ApiError::new(&rid, "bad_request", e.to_string()))?;
        catalog_import::import_remote(&state.pool, &state.fetcher, &body.url).await
    }
    .map_err(|e| map_import_error(&rid, &e))?;

    Ok(Json(ApiResponse {
        data: ImportData {
            success: true,
            imported: outcome.rows_imported,
        },
        meta: ResponseMeta::new(rid),
    }))
}

/// Pulls the `file` part out of a multipart body.
async fn read_uploaded_file(request_id: &str, req: Request) -> Result<Vec<u8>, ApiError> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| ApiError::new(request_id, "bad_request", e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(request_id, "bad_request", e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(request_id, "bad_request", e.to_string()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::new(
        request_id,
        "validation_error",
        "multipart body must include a 'file' part",
    ))
}

/// GET /api/v1/imports — recent import log rows, newest first.
pub(super) async fn list_imports(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ImportLogQuery>,
) -> Result<Json<ApiResponse<Vec<ImportLogItem>>>, ApiError> {
    let rows = catalog_db::list_import_logs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| ImportLogItem {
            id: row.id,
            kind: row.kind,
            file_ref: row.file_ref,
            source_url: row.source_url,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
