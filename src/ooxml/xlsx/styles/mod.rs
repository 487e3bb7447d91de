//! Style table and number-format resolution.
//!
//! The style table is loaded once per workbook and then only read: a decode
//! session borrows it and resolves each styled cell's style index into a
//! [`FormatContext`] (format ID plus format code).
//!
//! # Architecture
//!
//! - `parser`: XML parsing logic for styles.xml
//! - `number_format`: Number format definitions, built-in codes and date detection
//! - `cell_style`: Cell format records (`cellXfs`)
//!
//! # Example
//!
//! ```rust
//! use rowstream::ooxml::xlsx::StyleTable;
//!
//! let styles = StyleTable::parse(
//!     r#"<styleSheet><cellXfs count="1"><xf numFmtId="14"/></cellXfs></styleSheet>"#,
//! )?;
//!
//! let format = styles.resolve(Some(0))?;
//! assert_eq!(format.format_index, Some(14));
//! assert!(format.is_date());
//! # Ok::<(), rowstream::Error>(())
//! ```

mod cell_style;
mod number_format;
mod parser;

pub use cell_style::CellStyle;
pub use number_format::{NumberFormat, builtin_format_code, is_builtin_date_format, is_date_format};

use std::collections::HashMap;

use crate::common::{Error, Result};

/// Styles collection for an Excel workbook, reduced to number formatting.
#[derive(Debug, Default, Clone)]
pub struct StyleTable {
    /// Custom number formats (ID -> format code)
    pub number_formats: HashMap<u32, NumberFormat>,
    /// Cell format records (cellXfs - the actual styles applied to cells)
    pub cell_xfs: Vec<CellStyle>,
}

/// Formatting context of one numeric cell.
///
/// Both fields are absent for unstyled cells. `format_string` may still be
/// absent for a styled cell whose format ID is neither custom nor built-in;
/// such values are rendered verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatContext<'a> {
    pub format_index: Option<u32>,
    pub format_string: Option<&'a str>,
}

impl FormatContext<'_> {
    /// Whether numeric values in this context are serial dates.
    #[inline]
    pub fn is_date(&self) -> bool {
        self.format_index.is_some_and(is_builtin_date_format)
            || self.format_string.is_some_and(is_date_format)
    }
}

impl StyleTable {
    /// Create a new empty style table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse styles from xl/styles.xml content.
    pub fn parse(content: &str) -> Result<Self> {
        parser::parse_styles(content)
    }

    /// Append a cell format record, returning its style index.
    pub fn push_cell_style(&mut self, style: CellStyle) -> usize {
        self.cell_xfs.push(style);
        self.cell_xfs.len() - 1
    }

    /// Register a custom number format code under `id`.
    pub fn insert_number_format(&mut self, id: u32, code: impl Into<String>) {
        self.number_formats.insert(id, NumberFormat::new(id, code.into()));
    }

    /// Get the number of cell styles defined.
    #[inline]
    pub fn cell_style_count(&self) -> usize {
        self.cell_xfs.len()
    }

    /// Format code for a number format ID, custom formats first, then built-ins.
    pub fn format_code(&self, id: u32) -> Option<&str> {
        match self.number_formats.get(&id) {
            Some(format) => Some(format.code.as_str()),
            None => builtin_format_code(id),
        }
    }

    /// Resolve a cell's style index into its formatting context.
    ///
    /// An absent index means "default number, no special format". An index
    /// past the end of the table is [`Error::StyleIndexOutOfRange`].
    pub fn resolve(&self, style_index: Option<usize>) -> Result<FormatContext<'_>> {
        let Some(index) = style_index else {
            return Ok(FormatContext::default());
        };

        let style = self
            .cell_xfs
            .get(index)
            .ok_or_else(|| Error::StyleIndexOutOfRange {
                index,
                len: self.cell_xfs.len(),
            })?;

        let id = style.effective_num_fmt_id();
        Ok(FormatContext {
            format_index: Some(id),
            format_string: self.format_code(id),
        })
    }
}
