//! Delimited text (CSV/TSV) output for accepted rows.

use std::io::Write;

use crate::common::Result;
use crate::ooxml::xlsx::AcceptedRow;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// How separators, quotes and line breaks inside a field are protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeConvention {
    /// Quote the field; embedded quotes are doubled.
    #[default]
    Excel,
    /// Prefix separators and line feeds with a backslash.
    Unix,
}

/// Line terminator written between rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub separator: char,
    pub convention: EscapeConvention,
    pub line_ending: LineEnding,
    pub write_bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            convention: EscapeConvention::Excel,
            line_ending: LineEnding::Lf,
            write_bom: false,
        }
    }
}

impl CsvOptions {
    pub fn csv() -> Self {
        Self::default()
    }

    pub fn tsv() -> Self {
        Self {
            separator: '\t',
            ..Self::default()
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_convention(mut self, convention: EscapeConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_write_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }
}

/// Writes accepted rows as delimited text.
///
/// Every line has as many fields as the widest row; absent cells are empty
/// fields. Trailing whitespace other than the separator itself is trimmed
/// from each line, and no line terminator follows the last row.
///
/// # Example
///
/// ```rust
/// use rowstream::ooxml::xlsx::AcceptedRow;
/// use rowstream::sheet::text::{CsvOptions, CsvWriter};
///
/// let rows = vec![
///     AcceptedRow::new(vec![Some("Name".into()), Some("Note".into())]),
///     AcceptedRow::new(vec![Some("Ann".into()), Some("a, b".into())]),
/// ];
///
/// let mut out = Vec::new();
/// CsvWriter::new(CsvOptions::csv()).write_rows(&rows, &mut out)?;
/// assert_eq!(String::from_utf8(out).unwrap(), "Name,Note\nAnn,\"a, b\"");
/// # Ok::<(), rowstream::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvWriter {
    options: CsvOptions,
}

impl CsvWriter {
    pub fn new(options: CsvOptions) -> Self {
        CsvWriter { options }
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Write all rows to `writer`.
    pub fn write_rows<W: Write>(&self, rows: &[AcceptedRow], writer: &mut W) -> Result<()> {
        if self.options.write_bom {
            writer.write_all(&UTF8_BOM)?;
        }

        let width = rows.iter().map(AcceptedRow::width).max().unwrap_or(0);
        let separator = self.options.separator;
        let mut line = String::with_capacity(width * 8);

        for (row_idx, row) in rows.iter().enumerate() {
            line.clear();
            for col_idx in 0..width {
                if col_idx > 0 {
                    line.push(separator);
                }
                if let Some(value) = row.get(col_idx) {
                    line.push_str(&self.escape_field(value));
                }
            }

            let trimmed = line.trim_end_matches(|c: char| c.is_whitespace() && c != separator);
            writer.write_all(trimmed.as_bytes())?;
            if row_idx + 1 < rows.len() {
                writer.write_all(self.options.line_ending.as_str().as_bytes())?;
            }
        }

        Ok(())
    }

    /// Escape one field according to the configured convention.
    pub fn escape_field(&self, value: &str) -> String {
        let separator = self.options.separator;
        match self.options.convention {
            EscapeConvention::Excel => {
                if value.contains('"') {
                    format!("\"{}\"", value.replace('"', "\"\"")).trim().to_string()
                } else if value.contains(separator) || value.contains('\n') {
                    format!("\"{}\"", value).trim().to_string()
                } else {
                    value.trim().to_string()
                }
            },
            EscapeConvention::Unix => {
                let mut out = String::with_capacity(value.len() + 4);
                for ch in value.chars() {
                    if ch == separator || ch == '\n' {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                out
            },
        }
    }
}
