//! Shared test utilities and constants.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rust_decimal_macros::dec;

use lotsizer::{InstrumentDefinition, JsonFileStore};

/// Returns the path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copies a fixture into `dir` under the store's file name and returns a
/// store reading it.
pub fn store_from_fixture(dir: &Path, fixture: &str) -> JsonFileStore {
    let store = JsonFileStore::in_dir(dir);
    std::fs::copy(fixtures_dir().join(fixture), store.path()).expect("failed to copy fixture");
    store
}

/// The custom instrument used throughout the catalog tests.
pub fn gold() -> InstrumentDefinition {
    InstrumentDefinition::new("GOLD", dec!(0.5), dec!(0.1), dec!(0.1))
}
