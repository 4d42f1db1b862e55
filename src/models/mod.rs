//! Shared data models.
//!
//! Contains the instrument definition persisted by the catalog and the
//! built-in default table.

pub mod instrument;

pub use instrument::{FALLBACK_INSTRUMENT, InstrumentDefinition, builtin_defaults};
