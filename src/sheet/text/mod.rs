//! Text renderings of decoded rows (CSV, TSV, HTML).
//!
//! These writers sit downstream of the decoder: they take the accepted rows of
//! a sheet and serialize them. Escaping for the output format is their only
//! concern; the row values arrive fully resolved.

pub mod delimited;
pub mod html;

pub use delimited::{CsvOptions, CsvWriter, EscapeConvention, LineEnding};
pub use html::{HtmlOptions, HtmlTableWriter};
