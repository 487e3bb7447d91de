//! Session parameters for decoding one sheet.

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// Parameters of a decode session.
///
/// `min_columns` fixes the width of every output row; a cell at or beyond it
/// aborts the session. A row is kept only when `required_column` holds a value.
///
/// # Example
///
/// ```rust
/// use rowstream::ooxml::xlsx::DecodeOptions;
///
/// let options = DecodeOptions::new().with_min_columns(5).with_required_column(2);
/// assert!(options.validate().is_ok());
/// assert!(DecodeOptions::new().with_min_columns(2).with_required_column(2).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Width of every output row
    pub min_columns: usize,
    /// Column that must be present for a row to be accepted
    pub required_column: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            min_columns: 1,
            required_column: 0,
        }
    }
}

impl DecodeOptions {
    /// Create options with default settings (one column, column 0 required).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row width.
    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    /// Set the column whose presence decides row acceptance.
    pub fn with_required_column(mut self, required_column: usize) -> Self {
        self.required_column = required_column;
        self
    }

    /// Check the options before a session starts.
    pub fn validate(&self) -> Result<()> {
        if self.min_columns == 0 {
            return Err(Error::InvalidOptions("min_columns must be at least 1".to_string()));
        }
        if self.required_column >= self.min_columns {
            return Err(Error::InvalidOptions(format!(
                "required_column {} is outside the row width {}",
                self.required_column, self.min_columns
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = DecodeOptions::default();
        assert_eq!(options.min_columns, 1);
        assert_eq!(options.required_column, 0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_widths() {
        assert!(matches!(
            DecodeOptions::new().with_min_columns(0).validate(),
            Err(Error::InvalidOptions(_))
        ));
        assert!(matches!(
            DecodeOptions::new().with_min_columns(3).with_required_column(3).validate(),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let options: DecodeOptions = serde_json::from_str(r#"{"min_columns": 4}"#).unwrap();
        assert_eq!(options, DecodeOptions::new().with_min_columns(4));
    }
}
