//! Pipeline orchestration: rows in, upserted catalog rows and one audit
//! record out.

use std::collections::HashMap;

use catalog_core::{ImportSource, SheetRow};
use catalog_db::ProductInsert;
use sqlx::PgPool;

use crate::error::ImportError;
use crate::fetch::RemoteFetcher;
use crate::normalize::normalize_rows;
use crate::sheet::parse_rows;

/// Result of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Source row count: every parsed data row, before name-deduplication
    /// and before nameless rows are skipped.
    pub rows_imported: usize,
}

/// Imports an uploaded file: parse, then run the row pipeline.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] if the content is not tabular, or any
/// error from [`import_rows`].
pub async fn import_file_bytes(pool: &PgPool, bytes: &[u8]) -> Result<ImportOutcome, ImportError> {
    let rows = parse_rows(bytes)?;
    import_rows(pool, &rows, &ImportSource::FileUpload).await
}

/// Imports from a remote URL: fetch, parse, then run the row pipeline.
///
/// # Errors
///
/// Returns [`ImportError::Fetch`] / [`ImportError::UnexpectedStatus`] if the
/// fetch fails, [`ImportError::Parse`] if the content is not tabular, or any
/// error from [`import_rows`].
pub async fn import_remote(
    pool: &PgPool,
    fetcher: &RemoteFetcher,
    url: &str,
) -> Result<ImportOutcome, ImportError> {
    let bytes = fetcher.fetch_bytes(url).await?;
    let rows = parse_rows(&bytes)?;
    import_rows(pool, &rows, &ImportSource::RemoteUrl(url.to_owned())).await
}

/// Runs the normalizer/resolver and writer stages over already-parsed rows.
///
/// Brand resolution is strictly sequential: one get-or-create round-trip per
/// distinct name, in first-appearance order. Product records whose brand
/// name is missing, or missing from the resolution map, carry a `NULL` brand
/// rather than failing the batch. The bulk product write is a single
/// statement; records are deduplicated by name beforehand (last occurrence
/// wins, matching the overwrite semantics of the upsert itself).
///
/// The audit row is appended after the product write. A failed append is
/// non-fatal: the products are already durable, so the failure is logged and
/// the import still reports success.
///
/// # Errors
///
/// Returns [`ImportError::Persistence`] if brand resolution or the bulk
/// product write fails.
pub async fn import_rows(
    pool: &PgPool,
    rows: &[SheetRow],
    source: &ImportSource,
) -> Result<ImportOutcome, ImportError> {
    let (records, brand_names) = normalize_rows(rows);

    let mut brand_ids: HashMap<String, i64> = HashMap::with_capacity(brand_names.len());
    for name in &brand_names {
        let id = catalog_db::upsert_brand_by_name(pool, name).await?;
        brand_ids.insert(name.clone(), id);
    }

    let mut position: HashMap<String, usize> = HashMap::new();
    let mut inserts: Vec<ProductInsert> = Vec::with_capacity(records.len());
    for record in records {
        let brand_id = record
            .brand_name
            .as_ref()
            .and_then(|name| brand_ids.get(name).copied());

        let insert = ProductInsert {
            name: record.name,
            brand_id,
            price: record.price,
            description: record.description,
            category: record.category,
            subcategory: record.subcategory,
            image_url: record.image_url,
        };

        match position.get(&insert.name) {
            Some(&at) => inserts[at] = insert,
            None => {
                position.insert(insert.name.clone(), inserts.len());
                inserts.push(insert);
            }
        }
    }

    catalog_db::bulk_upsert_products(pool, &inserts).await?;

    if let Err(e) = catalog_db::insert_import_log(
        pool,
        source.kind(),
        source.file_ref(),
        source.source_url(),
    )
    .await
    {
        tracing::warn!(error = %e, "products written but import log append failed");
    }

    tracing::info!(
        rows = rows.len(),
        products = inserts.len(),
        brands = brand_names.len(),
        kind = source.kind(),
        "import complete"
    );

    Ok(ImportOutcome {
        rows_imported: rows.len(),
    })
}
