//! Markup text helpers.

mod escape;

pub use escape::escape_markup;
