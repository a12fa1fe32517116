//! Spreadsheet import pipeline: fetch or accept a tabular file, parse it
//! into rows, normalize them into product records, resolve brand names to
//! ids, and bulk-upsert the results.
//!
//! Control flow is strictly sequential (reader, then normalizer/resolver,
//! then writer) and one import runs start-to-finish inside its caller with
//! no background work.

pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod sheet;

pub use error::ImportError;
pub use fetch::RemoteFetcher;
pub use pipeline::{import_file_bytes, import_remote, import_rows, ImportOutcome};
pub use sheet::parse_rows;
