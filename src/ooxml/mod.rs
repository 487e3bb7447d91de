//! Office Open XML support.
//!
//! Only SpreadsheetML (`.xlsx`) is handled, and only for reading cell values.

pub mod xlsx;
