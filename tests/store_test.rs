//! JSON file store tests.

mod common;

use rust_decimal_macros::dec;
use tempfile::TempDir;

use lotsizer::{InstrumentDefinition, InstrumentStore, JsonFileStore, LotsizerError};

#[test]
fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::in_dir(dir.path());

    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::in_dir(dir.path());
    let snapshot = vec![
        InstrumentDefinition::new("SPX500", dec!(2.0), dec!(0.2), dec!(0.5)),
        common::gold(),
    ];

    store.save(&snapshot).unwrap();

    assert_eq!(store.load().unwrap(), snapshot);
    assert!(!dir.path().join("customInstruments.json.tmp").exists());
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/deeper/instruments.json");
    let mut store = JsonFileStore::new(&path);

    store.save(&[common::gold()]).unwrap();

    assert!(path.exists());
}

#[test]
fn test_saved_file_uses_camel_case_keys() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::in_dir(dir.path());
    store.save(&[common::gold()]).unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value[0]["name"], "GOLD");
    assert_eq!(value[0]["dollarCostPerUnit"], 0.5);
    assert_eq!(value[0]["unitToVolumeConversion"], 0.1);
    assert_eq!(value[0]["standardLotSize"], 0.1);
}

#[test]
fn test_fixture_loads() {
    let dir = TempDir::new().unwrap();
    let store = common::store_from_fixture(dir.path(), "overrides.json");

    let loaded = store.load().unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].name, "SPX500");
    assert_eq!(loaded[0].dollar_cost_per_unit, dec!(2.0));
    assert_eq!(loaded[1], common::gold());
}

#[test]
fn test_string_amounts_are_accepted() {
    let dir = TempDir::new().unwrap();
    let store = common::store_from_fixture(dir.path(), "overrides_string_amounts.json");

    let loaded = store.load().unwrap();

    assert_eq!(loaded[0].dollar_cost_per_unit, dec!(1.25));
    assert_eq!(loaded[0].standard_lot_size, dec!(0.01));
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = common::store_from_fixture(dir.path(), "overrides_corrupt.json");

    assert!(matches!(store.load(), Err(LotsizerError::Json(_))));
}

#[test]
fn test_empty_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    std::fs::write(store.path(), "  \n").unwrap();

    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_unwritable_location_is_store_error() {
    let dir = TempDir::new().unwrap();
    // A regular file where the parent directory should be.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let mut store = JsonFileStore::new(blocker.join("customInstruments.json"));

    assert!(matches!(
        store.save(&[common::gold()]),
        Err(LotsizerError::Store(_))
    ));
}
