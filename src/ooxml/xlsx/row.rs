//! Fixed-width row buffer and row acceptance.

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// An accepted row: one optional value per column, absent meaning an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptedRow(Vec<Option<String>>);

impl AcceptedRow {
    /// Build a row from its cells.
    pub fn new(cells: Vec<Option<String>>) -> Self {
        AcceptedRow(cells)
    }

    /// Cell values in column order.
    #[inline]
    pub fn cells(&self) -> &[Option<String>] {
        &self.0
    }

    /// Value at `column`, if present.
    #[inline]
    pub fn get(&self, column: usize) -> Option<&str> {
        self.0.get(column).and_then(|cell| cell.as_deref())
    }

    /// Number of columns (present or absent).
    #[inline]
    pub fn width(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Option<String>>> for AcceptedRow {
    fn from(cells: Vec<Option<String>>) -> Self {
        AcceptedRow(cells)
    }
}

/// Accumulates one row at a time into a reused buffer of fixed width.
///
/// The buffer is allocated once per session. Accepting a row copies the
/// buffer out, so accepted rows never alias the scratch space.
#[derive(Debug)]
pub struct RowBuilder {
    buffer: Vec<Option<String>>,
    required_column: usize,
    rows: Vec<AcceptedRow>,
}

impl RowBuilder {
    /// Create a builder for rows of `width` columns that are kept only when
    /// `required_column` holds a value.
    pub fn new(width: usize, required_column: usize) -> Self {
        RowBuilder {
            buffer: vec![None; width],
            required_column,
            rows: Vec::new(),
        }
    }

    /// Row width fixed for the session.
    #[inline]
    pub fn width(&self) -> usize {
        self.buffer.len()
    }

    /// Store `value` at `column` of the current row.
    pub fn write(&mut self, column: usize, value: String) -> Result<()> {
        let width = self.buffer.len();
        let slot = self
            .buffer
            .get_mut(column)
            .ok_or(Error::ColumnOutOfRange { column, width })?;
        *slot = Some(value);
        Ok(())
    }

    /// Finish the current row: keep a copy if the required column is present,
    /// then clear the buffer for the next row. Returns whether the row was kept.
    pub fn accept_or_discard(&mut self) -> bool {
        let accepted = self
            .buffer
            .get(self.required_column)
            .is_some_and(Option::is_some);

        if accepted {
            self.rows.push(AcceptedRow(self.buffer.clone()));
        }
        self.buffer.fill(None);
        accepted
    }

    /// Rows accepted so far, in document order.
    #[inline]
    pub fn rows(&self) -> &[AcceptedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AcceptedRow> {
        self.rows
    }
}
