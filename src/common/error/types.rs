//! Error taxonomy for sheet decoding.
//!
//! Every variant here is fatal to the decode session that produced it. The one
//! recoverable condition, an unparseable shared-string index, is reported as a
//! [`CellIssue`](crate::ooxml::xlsx::CellIssue) instead and never unwinds.
use thiserror::Error;

/// Main error type for rowstream operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Cell reference has no digit boundary or contains non-letter column characters
    #[error("Malformed cell reference: {0:?}")]
    MalformedReference(String),

    /// Style index is beyond the end of the style table
    #[error("Style index {index} out of range (style table has {len} entries)")]
    StyleIndexOutOfRange { index: usize, len: usize },

    /// A cell targets a column at or beyond the declared row width
    #[error("Column {column} out of range for row width {width}")]
    ColumnOutOfRange { column: usize, width: usize },

    /// Row end arrived while a cell or its value was still open
    #[error("Row {row} ended while cell {reference:?} was still open")]
    UnexpectedRowEnd { row: u32, reference: String },

    /// Event arrived that the decoder state machine cannot accept
    #[error("Unexpected markup event: {0}")]
    UnexpectedEvent(String),

    /// Decode options rejected before the session started
    #[error("Invalid decode options: {0}")]
    InvalidOptions(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Required package part is missing
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// No worksheet with the requested name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl Error {
    /// Whether this error was caused by the markup event source breaking the
    /// row/cell/value nesting protocol, as opposed to bad content or options.
    #[inline]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::UnexpectedRowEnd { .. } | Error::UnexpectedEvent(_))
    }
}

/// Result type for rowstream operations.
pub type Result<T> = std::result::Result<T, Error>;
