//! Streaming sheet decoder.
//!
//! [`SheetStreamDriver`] consumes [`MarkupEvent`]s for one worksheet and turns
//! them into accepted rows while holding at most one row of state. Style and
//! shared-string tables are borrowed read-only, so one set of tables can back
//! several sessions.

mod driver;
mod event;

pub use driver::{SessionOutput, SheetOutcome, SheetStreamDriver, SheetSummary, decode_events};
pub use event::MarkupEvent;
