//! Rowstream - constant-memory row extraction from XLSX worksheets
//!
//! This library decodes a single worksheet of an `.xlsx` workbook in one
//! streaming pass, turning cells into formatted text and collecting rows into
//! a fixed-width buffer. Memory use is bounded by one row plus the workbook's
//! shared-string and style tables, regardless of sheet size.
//!
//! # Features
//!
//! - **Streaming decoder**: an event-driven state machine over worksheet markup
//! - **Typed values**: booleans, errors, formula results, inline and shared strings, numbers
//! - **Number formats**: built-in and custom format codes, serial dates as `yyyy-MM-dd HH:mm:ss`
//! - **Row filtering**: rows are kept only when a designated column holds a value
//! - **Output writers**: CSV/TSV with Excel or Unix escaping, and HTML tables
//!
//! # Example - Converting a sheet to CSV
//!
//! ```no_run
//! use rowstream::ooxml::xlsx::{DecodeOptions, XlsxPackage};
//! use rowstream::sheet::text::{CsvOptions, CsvWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut package = XlsxPackage::open("people.xlsx")?;
//! let options = DecodeOptions::new().with_min_columns(4).with_required_column(0);
//! let report = package.read_sheet("People", &options)?;
//!
//! let mut stdout = std::io::stdout();
//! CsvWriter::new(CsvOptions::csv()).write_rows(&report.rows, &mut stdout)?;
//! eprintln!("{} of {} rows accepted", report.summary.rows_accepted, report.summary.rows_seen);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Driving the decoder directly
//!
//! ```
//! use rowstream::ooxml::xlsx::{
//!     DecodeOptions, MarkupEvent, SharedStrings, SheetStreamDriver, StyleTable,
//! };
//!
//! # fn main() -> rowstream::Result<()> {
//! let styles = StyleTable::new();
//! let shared: SharedStrings = ["Name", "Age"].into_iter().collect();
//! let options = DecodeOptions::new().with_min_columns(3);
//!
//! let mut driver = SheetStreamDriver::new(&styles, &shared, &options)?;
//! driver.feed(MarkupEvent::RowStart(1))?;
//! for (reference, index) in [("A1", "0"), ("B1", "1")] {
//!     driver.feed(MarkupEvent::cell(reference, Some("s"), None))?;
//!     driver.feed(MarkupEvent::ValueOpen)?;
//!     driver.feed(MarkupEvent::Characters(index.to_string()))?;
//!     driver.feed(MarkupEvent::ValueClose)?;
//!     driver.feed(MarkupEvent::CellEnd)?;
//! }
//! driver.feed(MarkupEvent::RowEnd)?;
//!
//! let output = driver.finish()?;
//! assert_eq!(output.rows[0].cells(), &[Some("Name".to_string()), Some("Age".to_string()), None]);
//! # Ok(())
//! # }
//! ```

/// Error types and markup helpers shared by all modules
pub mod common;

/// OOXML (Office Open XML) spreadsheet decoding
///
/// This module provides the streaming worksheet decoder and access to
/// `.xlsx` packages.
pub mod ooxml;

/// Text renderings of decoded rows
pub mod sheet;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
