//! Position-sizing calculator for leveraged instruments.
//!
//! Provides a pure sizing engine that turns a risk budget, a stop-loss
//! distance, and an instrument's economics into a recommended trade volume
//! with an auditable breakdown, plus a persistent catalog of instrument
//! definitions (built-in defaults with user overrides and additions).

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
#[cfg(feature = "python")]
mod python;
pub mod sizing;
pub mod tui;

pub use catalog::store::{InstrumentStore, JsonFileStore, MemoryStore};
pub use catalog::{Catalog, CatalogEntry, Provenance, SaveStatus};
pub use error::{LotsizerError, Result, ValidationError};
pub use models::InstrumentDefinition;
pub use sizing::{CalculationResult, RiskBudget, RoundingPolicy, TradingParameters, calculate};
