//! Output writers for decoded sheets.

pub mod text;
