//! Excel (.xlsx) worksheet decoding.
//!
//! The decoder reads one worksheet in a single pass and in constant memory:
//! worksheet XML is turned into [`MarkupEvent`]s, and the
//! [`SheetStreamDriver`] turns those into [`AcceptedRow`]s using the
//! workbook's [`StyleTable`] and [`SharedStrings`].
//!
//! # Architecture
//!
//! - `reference`: A1-style reference decoding
//! - `styles`: style table, number formats and the style resolver
//! - `shared_strings` / `rich_text`: shared-string table and plain-text rules
//! - `format`: number and serial-date display formatting
//! - `value`: cell type tags and value resolution
//! - `row`: fixed-width row buffer and acceptance
//! - `stream`: markup events and the sheet state machine
//! - `parsers`: quick-xml readers for workbook and worksheet parts
//! - `package`: the `.xlsx` container
//!
//! # Example
//!
//! ```rust,no_run
//! use rowstream::ooxml::xlsx::{DecodeOptions, XlsxPackage};
//!
//! let mut package = XlsxPackage::open("people.xlsx")?;
//! let options = DecodeOptions::new().with_min_columns(3).with_required_column(0);
//! let report = package.read_sheet("Sheet1", &options)?;
//!
//! for row in &report.rows {
//!     println!("{:?}", row.cells());
//! }
//! # Ok::<(), rowstream::Error>(())
//! ```

pub mod format;
pub mod options;
pub mod package;
pub mod parsers;
pub mod reference;
pub mod rich_text;
pub mod row;
pub mod shared_strings;
pub mod stream;
pub mod styles;
pub mod value;


pub use format::{format_general, format_number, format_serial_date, serial_to_datetime};
pub use options::DecodeOptions;
pub use package::{PartialRead, SheetReport, XlsxPackage};
pub use parsers::worksheet_parser::WorksheetEventReader;
pub use reference::{CellAddress, column_index, column_letters, decode_reference};
pub use rich_text::plain_text;
pub use row::{AcceptedRow, RowBuilder};
pub use shared_strings::SharedStrings;
pub use stream::{MarkupEvent, SessionOutput, SheetOutcome, SheetStreamDriver, SheetSummary, decode_events};
pub use styles::{CellStyle, FormatContext, NumberFormat, StyleTable};
pub use value::{CellContext, CellIssue, CellIssueKind, CellTypeTag, Resolved, resolve_value};
