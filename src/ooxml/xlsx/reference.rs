//! Cell reference decoding.
//!
//! Converts A1-style references (`"BC12"`) into zero-based column indices.
//! Column letters are a bijective base-26 numeral: `A=0 .. Z=25`, `AA=26`.

use crate::common::{Error, Result};

/// Decoded coordinates of a single cell.
///
/// `row` is the 1-based row number written in the reference; `column` is
/// zero-based and always derived from the reference letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub column: usize,
}

/// Decode column letters (`"A"`, `"AZ"`, `"XFD"`) into a zero-based column index.
///
/// Letters are matched case-insensitively. An empty string or any non-letter
/// byte is a [`Error::MalformedReference`].
///
/// # Examples
///
/// ```
/// use rowstream::ooxml::xlsx::column_index;
/// assert_eq!(column_index("A").unwrap(), 0);
/// assert_eq!(column_index("AA").unwrap(), 26);
/// assert_eq!(column_index("BA").unwrap(), 52);
/// ```
pub fn column_index(letters: &str) -> Result<usize> {
    if letters.is_empty() {
        return Err(Error::MalformedReference(letters.to_string()));
    }

    let mut column: i64 = -1;
    for &byte in letters.as_bytes() {
        if !byte.is_ascii_alphabetic() {
            return Err(Error::MalformedReference(letters.to_string()));
        }
        let digit = (byte.to_ascii_uppercase() - b'A') as i64;
        column = (column + 1)
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .filter(|c| *c <= u32::MAX as i64)
            .ok_or_else(|| Error::MalformedReference(letters.to_string()))?;
    }

    Ok(column as usize)
}

/// Decode a full cell reference into its address.
///
/// The column letters are everything before the first ASCII digit; the
/// remainder must be the row number.
pub fn decode_reference(reference: &str) -> Result<CellAddress> {
    let bytes = reference.as_bytes();
    let first_digit = bytes
        .iter()
        .position(u8::is_ascii_digit)
        .ok_or_else(|| Error::MalformedReference(reference.to_string()))?;

    let column = column_index(&reference[..first_digit])
        .map_err(|_| Error::MalformedReference(reference.to_string()))?;

    let row: u32 = atoi_simd::parse(&bytes[first_digit..])
        .map_err(|_| Error::MalformedReference(reference.to_string()))?;

    Ok(CellAddress { row, column })
}

/// Column letters for a zero-based column index; the inverse of [`column_index`].
pub fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::with_capacity(3);
    loop {
        letters.push(b'A' + (column % 26) as u8);
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
