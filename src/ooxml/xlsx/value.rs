//! Cell value resolution.
//!
//! A cell's raw text is turned into its final row representation according to
//! the cell's type tag. The tag, address and number format of a cell are fixed
//! when the cell opens and travel together as an immutable [`CellContext`].

use std::fmt;

use super::format::{format_number, format_serial_date};
use super::reference::{CellAddress, column_letters};
use super::rich_text::plain_text;
use super::shared_strings::SharedStrings;
use super::styles::FormatContext;

/// Value type of a cell, taken from its `t` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellTypeTag {
    /// `t="b"`
    Bool,
    /// `t="e"`
    Error,
    /// `t="str"`: cached result of a formula
    FormulaResult,
    /// `t="inlineStr"`
    InlineString,
    /// `t="s"`: index into the shared-string table
    SharedStringRef,
    /// No `t` attribute (or `t="n"`)
    #[default]
    Number,
}

impl CellTypeTag {
    /// Classify a cell's `t` attribute.
    ///
    /// Every attribute value maps to a tag: anything unrecognised (including
    /// `n` and the rarely written `d`) is treated as a number.
    pub fn from_type_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("b") => CellTypeTag::Bool,
            Some("e") => CellTypeTag::Error,
            Some("str") => CellTypeTag::FormulaResult,
            Some("inlineStr") => CellTypeTag::InlineString,
            Some("s") => CellTypeTag::SharedStringRef,
            _ => CellTypeTag::Number,
        }
    }
}

/// Everything known about a cell before its value text arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellContext<'a> {
    pub address: CellAddress,
    pub type_tag: CellTypeTag,
    pub format: FormatContext<'a>,
}

/// Outcome of resolving one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Final text to store in the row.
    Value(String),
    /// The cell could not be resolved but decoding continues; the cell stays absent.
    Recovered(CellIssueKind),
}

/// Kind of a recoverable per-cell problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellIssueKind {
    /// The shared-string index is not a non-negative integer.
    SharedStringIndexInvalid(String),
    /// The shared-string index is past the end of the table.
    SharedStringIndexMissing { index: usize, len: usize },
}

/// A recoverable problem recorded against a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellIssue {
    pub address: CellAddress,
    pub kind: CellIssueKind,
}

impl fmt::Display for CellIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = format!("{}{}", column_letters(self.address.column), self.address.row);
        match &self.kind {
            CellIssueKind::SharedStringIndexInvalid(raw) => {
                write!(f, "{}: invalid shared string index {:?}", reference, raw)
            },
            CellIssueKind::SharedStringIndexMissing { index, len } => write!(
                f,
                "{}: shared string index {} out of range (table has {} entries)",
                reference, index, len
            ),
        }
    }
}

/// Resolve a cell's accumulated raw text into its row value.
pub fn resolve_value(ctx: CellContext<'_>, raw: &str, shared: &SharedStrings) -> Resolved {
    let value = match ctx.type_tag {
        CellTypeTag::Bool => {
            if raw.starts_with('0') {
                "FALSE".to_string()
            } else {
                "TRUE".to_string()
            }
        },
        CellTypeTag::Error => format!("\"ERROR:{}\"", raw),
        CellTypeTag::FormulaResult => quoted(raw),
        CellTypeTag::InlineString => quoted(&plain_text(raw)),
        CellTypeTag::SharedStringRef => return resolve_shared(raw, shared),
        CellTypeTag::Number => resolve_number(raw, ctx.format),
    };
    Resolved::Value(value)
}

#[inline]
fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    out.push_str(text);
    out.push('"');
    out
}

fn resolve_shared(raw: &str, shared: &SharedStrings) -> Resolved {
    let trimmed = raw.trim();
    let index: usize = match atoi_simd::parse(trimmed.as_bytes()) {
        Ok(index) => index,
        Err(_) => {
            return Resolved::Recovered(CellIssueKind::SharedStringIndexInvalid(raw.to_string()));
        },
    };

    match shared.get(index) {
        Some(text) => Resolved::Value(text.to_string()),
        None => Resolved::Recovered(CellIssueKind::SharedStringIndexMissing {
            index,
            len: shared.len(),
        }),
    }
}

fn resolve_number(raw: &str, format: FormatContext<'_>) -> String {
    let parsed: Option<f64> = fast_float2::parse(raw.trim()).ok();

    match parsed {
        Some(serial) if format.is_date() => {
            format_serial_date(serial).unwrap_or_else(|| raw.to_string())
        },
        Some(number) => match format.format_string {
            Some(code) => format_number(number, code),
            None => raw.to_string(),
        },
        None => raw.to_string(),
    }
}
