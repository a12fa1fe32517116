//! Row and record types shared by the import pipeline and the persistence layer.
//!
//! Spreadsheet cells are dynamically typed, so a parsed row is a map from
//! header-derived column name to a tagged [`CellValue`]. Field access goes
//! through explicit extraction methods that encode the fallback rules
//! (`name`/`product_name`, `subcategory`/`sub_category`) instead of ad hoc
//! key lookups scattered across callers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placeholder written to `import_logs.file_ref` for direct uploads, where no
/// stable source descriptor exists.
pub const UPLOADED_FILE_REF: &str = "uploaded-file";

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Returns `true` for [`CellValue::Empty`] and for text cells that are
    /// blank after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Renders the cell as trimmed text, or `None` if it is empty.
    ///
    /// Numbers render the way spreadsheet tools display them: integral values
    /// without a trailing `.0` (`42.0` → `"42"`), everything else via the
    /// standard float formatting.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_owned())
                }
            }
            #[allow(clippy::cast_possible_truncation)]
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{n}"))
                }
            }
        }
    }
}

/// One parsed spreadsheet row: header-derived column name to cell value.
///
/// Unknown columns are preserved; missing columns are simply absent keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    cells: HashMap<String, CellValue>,
}

impl SheetRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Extracts a column as trimmed text, `None` if absent or empty.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        self.cells.get(column).and_then(CellValue::as_text)
    }

    /// Extracts the first non-empty value among `columns`, in order.
    ///
    /// This is the single home of the fallback-field rules
    /// (`name`/`product_name`, `subcategory`/`sub_category`).
    #[must_use]
    pub fn text_any(&self, columns: &[&str]) -> Option<String> {
        columns.iter().find_map(|c| self.text(c))
    }

    /// Returns `true` if every cell in the row is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_empty)
    }
}

/// A normalized product row derived from one spreadsheet row, prior to brand
/// resolution. Every field except `name` tolerates absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Raw brand name as it appeared in the sheet; resolved to a brand id by
    /// the pipeline before persistence.
    pub brand_name: Option<String>,
    /// `None` when the cell is absent, empty, or not parseable as a number.
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
}

/// Where an import came from; determines the audit-log descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// A file uploaded directly with the request.
    FileUpload,
    /// A file fetched from a remote URL.
    RemoteUrl(String),
}

impl ImportSource {
    /// The `import_logs.kind` discriminator.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ImportSource::FileUpload => "file",
            ImportSource::RemoteUrl(_) => "remote-url",
        }
    }

    #[must_use]
    pub fn file_ref(&self) -> Option<&str> {
        match self {
            ImportSource::FileUpload => Some(UPLOADED_FILE_REF),
            ImportSource::RemoteUrl(_) => None,
        }
    }

    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        match self {
            ImportSource::FileUpload => None,
            ImportSource::RemoteUrl(url) => Some(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_as_text_trims_and_rejects_blank() {
        assert_eq!(
            CellValue::Text("  Widget  ".into()).as_text(),
            Some("Widget".to_owned())
        );
        assert_eq!(CellValue::Text("   ".into()).as_text(), None);
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn cell_as_text_renders_integral_numbers_without_fraction() {
        assert_eq!(CellValue::Number(42.0).as_text(), Some("42".to_owned()));
        assert_eq!(CellValue::Number(9.99).as_text(), Some("9.99".to_owned()));
    }

    #[test]
    fn text_any_prefers_first_non_empty_column() {
        let mut row = SheetRow::new();
        row.insert("name", CellValue::Empty);
        row.insert("product_name", CellValue::Text("Fallback Widget".into()));
        assert_eq!(
            row.text_any(&["name", "product_name"]),
            Some("Fallback Widget".to_owned())
        );

        row.insert("name", CellValue::Text("Primary Widget".into()));
        assert_eq!(
            row.text_any(&["name", "product_name"]),
            Some("Primary Widget".to_owned())
        );
    }

    #[test]
    fn blank_row_detection() {
        let mut row = SheetRow::new();
        row.insert("name", CellValue::Empty);
        row.insert("price", CellValue::Text("  ".into()));
        assert!(row.is_blank());

        row.insert("price", CellValue::Number(1.0));
        assert!(!row.is_blank());
    }

    #[test]
    fn import_source_descriptors() {
        let file = ImportSource::FileUpload;
        assert_eq!(file.kind(), "file");
        assert_eq!(file.file_ref(), Some(UPLOADED_FILE_REF));
        assert_eq!(file.source_url(), None);

        let remote = ImportSource::RemoteUrl("https://example.com/products.xlsx".into());
        assert_eq!(remote.kind(), "remote-url");
        assert_eq!(remote.file_ref(), None);
        assert_eq!(
            remote.source_url(),
            Some("https://example.com/products.xlsx")
        );
    }

    #[test]
    fn product_record_serializes_optional_fields_as_null() {
        let record = ProductRecord {
            name: "Widget".into(),
            brand_name: None,
            price: None,
            description: None,
            category: None,
            subcategory: None,
            image_url: None,
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["name"], "Widget");
        assert!(json["price"].is_null());
        assert!(json["brand_name"].is_null());
    }
}
