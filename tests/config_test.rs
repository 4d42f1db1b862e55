//! Configuration loading tests.

use std::path::PathBuf;
use std::sync::Mutex;

use lotsizer::RoundingPolicy;
use lotsizer::config::fetch_config;

/// Serializes tests that touch the process environment.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: [&str; 5] = [
    "LOTSIZER_STORE_PATH",
    "LOTSIZER_ROUNDING",
    "LOTSIZER_DEFAULT_INSTRUMENT",
    "LOTSIZER_LOG_FILE",
    "HOME",
];

/// Runs `f` with exactly `vars` set among the variables this crate reads.
fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

    // SAFETY: env mutation is serialized by ENV_LOCK.
    unsafe {
        for k in VARS {
            std::env::remove_var(k);
        }
        for (k, v) in vars {
            std::env::set_var(k, v);
        }
    }

    f();

    // SAFETY: restoring original values under the same lock.
    unsafe {
        for (k, original) in originals {
            match original {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }
    }
}

#[test]
fn test_store_path_drives_log_location() {
    with_env(&[("LOTSIZER_STORE_PATH", "/srv/lotsizer/store.json")], || {
        let config = fetch_config().unwrap();
        assert_eq!(config.store_path, PathBuf::from("/srv/lotsizer/store.json"));
        assert_eq!(config.log_file, PathBuf::from("/srv/lotsizer/lotsizer.log"));
    });
}

#[test]
fn test_rounding_aliases() {
    for (raw, expected) in [
        ("floored", RoundingPolicy::LotFloored),
        ("lot_floored", RoundingPolicy::LotFloored),
        ("unrounded", RoundingPolicy::Unrounded),
    ] {
        with_env(&[("LOTSIZER_ROUNDING", raw)], || {
            assert_eq!(fetch_config().unwrap().rounding, expected);
        });
    }
}

#[test]
fn test_unknown_rounding_is_config_error() {
    with_env(&[("LOTSIZER_ROUNDING", "banker")], || {
        assert!(matches!(
            fetch_config(),
            Err(lotsizer::LotsizerError::Config(_))
        ));
    });
}

#[test]
fn test_relative_store_without_home() {
    with_env(&[], || {
        let config = fetch_config().unwrap();
        assert_eq!(config.store_path, PathBuf::from("customInstruments.json"));
        assert_eq!(config.default_instrument, "SPX500");
    });
}
