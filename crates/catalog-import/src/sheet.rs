//! Spreadsheet reader: binary content in, ordered [`SheetRow`]s out.
//!
//! The format is sniffed from the content itself, never from a file name:
//! ZIP and OLE signatures go to calamine (xlsx/xlsb/ods and legacy xls,
//! first sheet only), anything else is attempted as delimited UTF-8 text.
//! Unknown columns are preserved; no schema validation happens here.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use catalog_core::{CellValue, SheetRow};

use crate::error::ImportError;

// xlsx/xlsb/ods are ZIP containers; legacy .xls is an OLE compound file.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Parses binary spreadsheet content into an ordered row sequence.
///
/// The first row is the header row; each following row becomes a [`SheetRow`]
/// keyed by header name. Rows whose cells are all empty are dropped, matching
/// the convention that trailing blank rows do not produce records. Duplicate
/// header names keep the rightmost column; columns with a blank header are
/// skipped entirely.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] if the content is not a recognized tabular
/// format.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<SheetRow>, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::parse("empty file"));
    }

    if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&OLE_MAGIC) {
        parse_workbook(bytes)
    } else {
        parse_delimited(bytes)
    }
}

fn parse_workbook(bytes: &[u8]) -> Result<Vec<SheetRow>, ImportError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| ImportError::parse(e.to_string()))?;

    // First sheet only; remaining sheets are ignored.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::parse("workbook has no sheets"))?
        .map_err(|e| ImportError::parse(e.to_string()))?;

    let mut rows_iter = range.rows();
    let Some(header_cells) = rows_iter.next() else {
        return Ok(Vec::new());
    };

    let headers: Vec<Option<String>> = header_cells
        .iter()
        .map(|cell| cell_from_data(cell).as_text())
        .collect();

    let rows = rows_iter
        .filter_map(|cells| row_from_cells(&headers, cells.iter().map(cell_from_data)))
        .collect();

    Ok(rows)
}

fn parse_delimited(bytes: &[u8]) -> Result<Vec<SheetRow>, ImportError> {
    let text =
        std::str::from_utf8(bytes).map_err(|_| ImportError::parse("not valid UTF-8 text"))?;

    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = sniff_delimiter(header_line)
        .ok_or_else(|| ImportError::parse("no column delimiter in header line"))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<Option<String>> = reader
        .headers()
        .map_err(|e| ImportError::parse(e.to_string()))?
        .iter()
        .map(|h| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::parse(e.to_string()))?;
        if let Some(row) = row_from_cells(&headers, record.iter().map(cell_from_str)) {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Picks the CSV delimiter from the header line.
///
/// A bare prose file has no delimiter and is rejected upstream as a parse
/// error instead of masquerading as a one-column sheet.
fn sniff_delimiter(header_line: &str) -> Option<u8> {
    [b',', b';', b'\t']
        .into_iter()
        .find(|&d| header_line.as_bytes().contains(&d))
}

/// Assembles one row, pairing cells with header names by column index.
///
/// Returns `None` for rows whose cells are all empty. Cells past the header
/// width, and cells under a blank header, are dropped; short rows simply
/// leave their trailing columns absent.
fn row_from_cells(
    headers: &[Option<String>],
    cells: impl Iterator<Item = CellValue>,
) -> Option<SheetRow> {
    let mut row = SheetRow::new();
    for (header, cell) in headers.iter().zip(cells) {
        if let Some(name) = header {
            row.insert(name.clone(), cell);
        }
    }

    if row.is_blank() {
        None
    } else {
        Some(row)
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn cell_from_str(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) => CellValue::Number(n),
        Err(_) => CellValue::Text(trimmed.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_delimited_text_with_typed_cells() {
        let csv = b"name,brand_name,price\nWidget,Acme,9.99\nGadget,Globex,N/A\n";
        let rows = parse_rows(csv).expect("parse csv");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("name").as_deref(), Some("Widget"));
        assert_eq!(rows[0].get("price"), Some(&CellValue::Number(9.99)));
        assert_eq!(
            rows[1].get("price"),
            Some(&CellValue::Text("N/A".to_owned()))
        );
    }

    #[test]
    fn parses_semicolon_delimited_text() {
        let csv = b"name;price\nWidget;1.50\n";
        let rows = parse_rows(csv).expect("parse csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("price"), Some(&CellValue::Number(1.5)));
    }

    #[test]
    fn drops_rows_with_only_empty_cells() {
        let csv = b"name,price\nWidget,9.99\n,\n  ,  \n";
        let rows = parse_rows(csv).expect("parse csv");
        assert_eq!(rows.len(), 1, "blank rows must not produce records");
    }

    #[test]
    fn short_rows_leave_trailing_columns_absent() {
        let csv = b"name,brand_name,price\nWidget\n";
        let rows = parse_rows(csv).expect("parse csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("name").as_deref(), Some("Widget"));
        assert_eq!(rows[0].get("brand_name"), None);
        assert_eq!(rows[0].get("price"), None);
    }

    #[test]
    fn blank_headers_are_skipped_and_duplicates_keep_rightmost() {
        let csv = b"name,,name\nleft,middle,right\n";
        let rows = parse_rows(csv).expect("parse csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("name").as_deref(), Some("right"));
    }

    #[test]
    fn plain_text_is_a_parse_error() {
        let text = b"this is just some prose pretending to be a spreadsheet";
        let result = parse_rows(text);
        assert!(
            matches!(result, Err(ImportError::Parse { .. })),
            "expected Parse error, got: {result:?}"
        );
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        let result = parse_rows(b"");
        assert!(matches!(result, Err(ImportError::Parse { .. })));
    }

    #[test]
    fn binary_junk_is_a_parse_error() {
        let junk = [0xFFu8, 0xFE, 0x00, 0x01, 0x02, 0x03];
        let result = parse_rows(&junk);
        assert!(matches!(result, Err(ImportError::Parse { .. })));
    }

    #[test]
    fn zip_content_that_is_not_a_workbook_is_a_parse_error() {
        // A bare ZIP local-file-header signature with garbage after it.
        let mut bytes = ZIP_MAGIC.to_vec();
        bytes.extend_from_slice(b"not actually a workbook");
        let result = parse_rows(&bytes);
        assert!(matches!(result, Err(ImportError::Parse { .. })));
    }

    #[test]
    fn unknown_columns_are_preserved() {
        let csv = b"name,mystery_column\nWidget,42\n";
        let rows = parse_rows(csv).expect("parse csv");
        assert_eq!(rows[0].get("mystery_column"), Some(&CellValue::Number(42.0)));
    }
}
