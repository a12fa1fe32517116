//! Database-backed tests for the import pipeline, from raw bytes through
//! brand resolution, the bulk product write, and the audit log.

use catalog_db::ProductListFilters;
use catalog_import::ImportError;
use rust_decimal::Decimal;

const SINGLE_ROW_CSV: &[u8] = b"name,brand_name,price\nWidget,Acme,9.99\n";

#[sqlx::test(migrations = "../../migrations")]
async fn single_row_import_writes_brand_product_and_log(pool: sqlx::PgPool) {
    let outcome = catalog_import::import_file_bytes(&pool, SINGLE_ROW_CSV)
        .await
        .expect("import");
    assert_eq!(outcome.rows_imported, 1);

    let brands = catalog_db::list_brands(&pool).await.expect("list brands");
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name, "Acme");

    let products = catalog_db::list_products(&pool, ProductListFilters::default())
        .await
        .expect("list products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Widget");
    assert_eq!(products[0].brand_id, Some(brands[0].id));
    assert_eq!(products[0].price, Some(Decimal::new(999, 2)));

    let logs = catalog_db::list_import_logs(&pool, 10).await.expect("logs");
    assert_eq!(logs.len(), 1, "exactly one audit row per invocation");
    assert_eq!(logs[0].kind, "file");
    assert_eq!(logs[0].file_ref.as_deref(), Some("uploaded-file"));
    assert_eq!(logs[0].source_url, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_brand_names_share_one_brand_row(pool: sqlx::PgPool) {
    let csv = b"name,brand_name\nWidget,Acme\nGadget,Acme\n";
    catalog_import::import_file_bytes(&pool, csv)
        .await
        .expect("import");

    let brands = catalog_db::list_brands(&pool).await.expect("list brands");
    assert_eq!(brands.len(), 1, "Acme must resolve to a single row");

    let products = catalog_db::list_products(&pool, ProductListFilters::default())
        .await
        .expect("list products");
    assert_eq!(products.len(), 2);
    assert!(
        products.iter().all(|p| p.brand_id == Some(brands[0].id)),
        "both products must reference the same brand id"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn reimporting_identical_names_is_idempotent(pool: sqlx::PgPool) {
    let csv = b"name,brand_name,price\nWidget,Acme,1.00\nGadget,Acme,2.00\n";
    catalog_import::import_file_bytes(&pool, csv)
        .await
        .expect("first import");
    catalog_import::import_file_bytes(&pool, csv)
        .await
        .expect("second import");

    let products = catalog_db::list_products(&pool, ProductListFilters::default())
        .await
        .expect("list products");
    assert_eq!(products.len(), 2, "one Product row per name, not two");

    let brands = catalog_db::list_brands(&pool).await.expect("list brands");
    assert_eq!(brands.len(), 1);

    // The audit trail, by contrast, grows by one row per invocation.
    let logs = catalog_db::list_import_logs(&pool, 10).await.expect("logs");
    assert_eq!(logs.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rows_without_brand_get_null_brand_id(pool: sqlx::PgPool) {
    let csv = b"name,brand_name,price\nWidget,Acme,9.99\nOrphan,,5.00\n";
    catalog_import::import_file_bytes(&pool, csv)
        .await
        .expect("import");

    let products = catalog_db::list_products(&pool, ProductListFilters::default())
        .await
        .expect("list products");
    let orphan = products
        .iter()
        .find(|p| p.name == "Orphan")
        .expect("Orphan row");
    assert_eq!(orphan.brand_id, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn malformed_price_imports_as_null(pool: sqlx::PgPool) {
    let csv = b"name,price\nWidget,N/A\n";
    catalog_import::import_file_bytes(&pool, csv)
        .await
        .expect("a malformed price must not fail the import");

    let products = catalog_db::list_products(&pool, ProductListFilters::default())
        .await
        .expect("list products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_product_names_in_one_sheet_keep_last_row(pool: sqlx::PgPool) {
    let csv = b"name,price\nWidget,1.00\nWidget,9.99\n";
    let outcome = catalog_import::import_file_bytes(&pool, csv)
        .await
        .expect("import");
    // Source row count, not the post-deduplication count.
    assert_eq!(outcome.rows_imported, 2);

    let products = catalog_db::list_products(&pool, ProductListFilters::default())
        .await
        .expect("list products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, Some(Decimal::new(999, 2)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn unparseable_content_fails_and_writes_nothing(pool: sqlx::PgPool) {
    let result =
        catalog_import::import_file_bytes(&pool, b"plain text claiming to be a spreadsheet").await;
    assert!(
        matches!(result, Err(ImportError::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );

    for table in ["brands", "products", "import_logs"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 0, "{table} must stay empty after a failed parse");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn xlsx_workbook_imports_through_the_same_pipeline(pool: sqlx::PgPool) {
    let bytes = include_bytes!("fixtures/products.xlsx");
    let outcome = catalog_import::import_file_bytes(&pool, bytes)
        .await
        .expect("import xlsx");
    assert_eq!(outcome.rows_imported, 2);

    let brands = catalog_db::list_brands(&pool).await.expect("list brands");
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name, "Acme");

    let products = catalog_db::list_products(&pool, ProductListFilters::default())
        .await
        .expect("list products");
    assert_eq!(products.len(), 2);

    let widget = products
        .iter()
        .find(|p| p.name == "Widget")
        .expect("Widget row");
    assert_eq!(widget.price, Some(Decimal::new(999, 2)));
    assert_eq!(widget.category.as_deref(), Some("Tools"));

    let gadget = products
        .iter()
        .find(|p| p.name == "Gadget")
        .expect("Gadget row");
    assert_eq!(gadget.price, None, "N/A price cell degrades to NULL");
}
