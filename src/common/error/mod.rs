//! Unified error types for rowstream.
//!
//! Fatal decode conditions and the ambient XML/ZIP/IO failures share one
//! error type so callers only have a single `Result` to handle.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
