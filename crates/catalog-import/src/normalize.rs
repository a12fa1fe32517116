//! Normalization from parsed sheet rows to [`ProductRecord`]s.
//!
//! Row-level problems never abort the batch: a missing optional field or a
//! malformed price degrades to `None`, and a row with no usable name is
//! skipped. The only hard failures in the pipeline happen later, at the
//! persistence boundary.

use std::collections::HashSet;

use catalog_core::{CellValue, ProductRecord, SheetRow};

/// Normalizes rows into product records and collects the distinct non-empty
/// brand names, in order of first appearance.
///
/// Rows where both `name` and `product_name` are absent are dropped: the
/// product upsert is keyed on name, so a nameless record has no identity to
/// write to.
#[must_use]
pub fn normalize_rows(rows: &[SheetRow]) -> (Vec<ProductRecord>, Vec<String>) {
    let mut records = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();
    let mut brand_names = Vec::new();

    for row in rows {
        let Some(record) = record_from_row(row) else {
            continue;
        };
        if let Some(brand) = &record.brand_name {
            if seen.insert(brand.clone()) {
                brand_names.push(brand.clone());
            }
        }
        records.push(record);
    }

    (records, brand_names)
}

fn record_from_row(row: &SheetRow) -> Option<ProductRecord> {
    let name = row.text_any(&["name", "product_name"])?;

    Some(ProductRecord {
        name,
        brand_name: row.text("brand_name"),
        price: price_from_cell(row.get("price")),
        description: row.text("description"),
        category: row.text("category"),
        subcategory: row.text_any(&["subcategory", "sub_category"]),
        image_url: row.text("image_url"),
    })
}

/// Extracts a price from a cell, tolerating malformed input.
///
/// Numeric cells pass through; text cells are parsed as `f64`. Parse failure
/// (`"N/A"`, `"call us"`) coerces to `None` rather than raising: malformed
/// price text is treated the same as a missing price. This leniency is
/// deliberate, and this function is its single home.
#[must_use]
pub fn price_from_cell(cell: Option<&CellValue>) -> Option<f64> {
    match cell? {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, CellValue)]) -> SheetRow {
        let mut row = SheetRow::new();
        for (column, value) in cells {
            row.insert(*column, value.clone());
        }
        row
    }

    #[test]
    fn normalizes_a_complete_row() {
        let rows = vec![row(&[
            ("name", CellValue::Text("Widget".into())),
            ("brand_name", CellValue::Text("Acme".into())),
            ("price", CellValue::Text("9.99".into())),
            ("description", CellValue::Text("A fine widget".into())),
            ("category", CellValue::Text("Tools".into())),
            ("subcategory", CellValue::Text("Hand tools".into())),
            ("image_url", CellValue::Text("https://img.example/w.png".into())),
        ])];

        let (records, brands) = normalize_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(brands, vec!["Acme".to_owned()]);

        let record = &records[0];
        assert_eq!(record.name, "Widget");
        assert_eq!(record.brand_name.as_deref(), Some("Acme"));
        assert_eq!(record.price, Some(9.99));
        assert_eq!(record.category.as_deref(), Some("Tools"));
        assert_eq!(record.subcategory.as_deref(), Some("Hand tools"));
    }

    #[test]
    fn falls_back_to_product_name_and_sub_category() {
        let rows = vec![row(&[
            ("product_name", CellValue::Text("Gadget".into())),
            ("sub_category", CellValue::Text("Widgets".into())),
        ])];

        let (records, _) = normalize_rows(&rows);
        assert_eq!(records[0].name, "Gadget");
        assert_eq!(records[0].subcategory.as_deref(), Some("Widgets"));
    }

    #[test]
    fn malformed_price_text_degrades_to_none() {
        let rows = vec![row(&[
            ("name", CellValue::Text("Widget".into())),
            ("price", CellValue::Text("N/A".into())),
        ])];

        let (records, _) = normalize_rows(&rows);
        assert_eq!(records.len(), 1, "a bad price must not drop the row");
        assert_eq!(records[0].price, None);
    }

    #[test]
    fn numeric_and_numeric_text_prices_both_parse() {
        assert_eq!(price_from_cell(Some(&CellValue::Number(12.5))), Some(12.5));
        assert_eq!(
            price_from_cell(Some(&CellValue::Text(" 9.99 ".into()))),
            Some(9.99)
        );
        assert_eq!(price_from_cell(Some(&CellValue::Empty)), None);
        assert_eq!(price_from_cell(None), None);
    }

    #[test]
    fn nameless_rows_are_skipped_without_aborting() {
        let rows = vec![
            row(&[("price", CellValue::Number(1.0))]),
            row(&[("name", CellValue::Text("Widget".into()))]),
        ];

        let (records, _) = normalize_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Widget");
    }

    #[test]
    fn duplicate_brand_names_collapse_to_one_entry() {
        let rows = vec![
            row(&[
                ("name", CellValue::Text("Widget".into())),
                ("brand_name", CellValue::Text("Acme".into())),
            ]),
            row(&[
                ("name", CellValue::Text("Gadget".into())),
                ("brand_name", CellValue::Text("Acme".into())),
            ]),
            row(&[
                ("name", CellValue::Text("Sprocket".into())),
                ("brand_name", CellValue::Text("Globex".into())),
            ]),
        ];

        let (records, brands) = normalize_rows(&rows);
        assert_eq!(records.len(), 3);
        assert_eq!(brands, vec!["Acme".to_owned(), "Globex".to_owned()]);
    }

    #[test]
    fn distinct_brands_never_exceed_rows_with_brand_names() {
        let rows = vec![
            row(&[
                ("name", CellValue::Text("A".into())),
                ("brand_name", CellValue::Text("Acme".into())),
            ]),
            row(&[("name", CellValue::Text("B".into()))]),
            row(&[
                ("name", CellValue::Text("C".into())),
                ("brand_name", CellValue::Empty),
            ]),
        ];

        let (records, brands) = normalize_rows(&rows);
        let with_brand = records.iter().filter(|r| r.brand_name.is_some()).count();
        assert!(brands.len() <= with_brand);
        assert_eq!(brands.len(), 1);
    }
}
