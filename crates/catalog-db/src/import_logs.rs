//! Database operations for the append-only `import_logs` table.
//!
//! One row per import invocation, written after the bulk product write
//! succeeds. Rows are never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `import_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportLogRow {
    pub id: i64,
    /// `"file"` or `"remote-url"`, enforced by a CHECK constraint.
    pub kind: String,
    pub file_ref: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appends one import log row and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_import_log(
    pool: &PgPool,
    kind: &str,
    file_ref: Option<&str>,
    source_url: Option<&str>,
) -> Result<ImportLogRow, DbError> {
    let row = sqlx::query_as::<_, ImportLogRow>(
        "INSERT INTO import_logs (kind, file_ref, source_url) \
         VALUES ($1, $2, $3) \
         RETURNING id, kind, file_ref, source_url, created_at",
    )
    .bind(kind)
    .bind(file_ref)
    .bind(source_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent import log rows, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_logs(pool: &PgPool, limit: i64) -> Result<Vec<ImportLogRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportLogRow>(
        "SELECT id, kind, file_ref, source_url, created_at \
         FROM import_logs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
