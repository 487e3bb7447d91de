//! Cell format records.

/// Cell format information from `cellXfs`.
///
/// Only the number-format side of the record is kept; fonts, fills and
/// borders have no bearing on a cell's textual value.
#[derive(Debug, Clone, Default)]
pub struct CellStyle {
    /// Number format ID (references built-in or custom number format)
    pub num_fmt_id: Option<u32>,
}

impl CellStyle {
    /// Create a new empty cell style.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell style that applies the given number format.
    #[inline]
    pub fn with_number_format(num_fmt_id: u32) -> Self {
        Self {
            num_fmt_id: Some(num_fmt_id),
        }
    }

    /// Number format ID in effect; records without one use General (0).
    #[inline]
    pub fn effective_num_fmt_id(&self) -> u32 {
        self.num_fmt_id.unwrap_or(0)
    }
}
