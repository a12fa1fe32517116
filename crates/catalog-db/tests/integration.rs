//! Offline unit tests for catalog-db pool configuration and row types.
//! These tests do not require a live database connection.

use catalog_core::{AppConfig, Environment};
use catalog_db::{PoolConfig, ProductInsert, ProductRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        fetch_timeout_secs: 30,
        fetch_user_agent: "ua".to_string(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ProductRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn product_row_has_expected_fields() {
    use chrono::Utc;

    let row = ProductRow {
        id: 42_i64,
        brand_id: Some(7_i64),
        name: "Widget".to_string(),
        price: None,
        description: Some("A widget".to_string()),
        category: None,
        subcategory: None,
        image_url: None,
        attributes: serde_json::json!({}),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 42);
    assert_eq!(row.brand_id, Some(7));
    assert_eq!(row.name, "Widget");
    assert!(row.price.is_none());
    assert!(row.attributes.is_object());
}

#[test]
fn product_insert_tolerates_fully_sparse_rows() {
    let record = ProductInsert {
        name: "Widget".to_string(),
        brand_id: None,
        price: None,
        description: None,
        category: None,
        subcategory: None,
        image_url: None,
    };

    assert_eq!(record.name, "Widget");
    assert!(record.brand_id.is_none());
    assert!(record.price.is_none());
}
