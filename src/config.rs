//! Application configuration loaded from environment variables.
//!
//! All variables are optional:
//! - `LOTSIZER_STORE_PATH`: JSON file holding the instrument overrides
//! - `LOTSIZER_ROUNDING`: `floored` (default, also `lot-floored` or
//!   `lot_floored`) or `unrounded`, case-insensitive
//! - `LOTSIZER_DEFAULT_INSTRUMENT`: instrument selected at startup
//! - `LOTSIZER_LOG_FILE`: where the terminal UI writes its log

use std::path::PathBuf;

use crate::catalog::store::STORE_KEY;
use crate::models::FALLBACK_INSTRUMENT;
use crate::sizing::RoundingPolicy;

/// Directory under `$HOME` used when no store path is configured.
const DEFAULT_DATA_DIR: &str = ".lotsizer";

/// Log file name placed next to the store when none is configured.
const DEFAULT_LOG_FILE: &str = "lotsizer.log";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_path: PathBuf,
    /// Rounding applied to every calculation in this deployment.
    pub rounding: RoundingPolicy,
    pub default_instrument: String,
    pub log_file: PathBuf,
}

/// Loads the application configuration from environment variables.
///
/// The store defaults to `$HOME/.lotsizer/customInstruments.json`, or to
/// `./customInstruments.json` when `HOME` is unset. The log file defaults
/// to `lotsizer.log` in the store's directory.
///
/// # Errors
///
/// Returns [`LotsizerError::Config`](crate::LotsizerError::Config) if
/// `LOTSIZER_ROUNDING` names an unknown policy.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let store_path = non_empty_var("LOTSIZER_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(default_store_path);

    let rounding = match non_empty_var("LOTSIZER_ROUNDING") {
        Some(raw) => raw.parse()?,
        None => RoundingPolicy::default(),
    };

    let default_instrument = non_empty_var("LOTSIZER_DEFAULT_INSTRUMENT")
        .unwrap_or_else(|| FALLBACK_INSTRUMENT.to_string());

    let log_file = non_empty_var("LOTSIZER_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            store_path
                .parent()
                .map(|dir| dir.join(DEFAULT_LOG_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
        });

    Ok(AppConfig {
        store_path,
        rounding,
        default_instrument,
        log_file,
    })
}

fn default_store_path() -> PathBuf {
    let file = format!("{STORE_KEY}.json");
    match non_empty_var("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_DATA_DIR).join(file),
        None => PathBuf::from(file),
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Helper that temporarily sets env vars, runs `f`, then restores originals.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let originals: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var(k).ok()))
            .collect();

        for (k, v) in vars {
            // SAFETY: env mutation is serialized by ENV_LOCK.
            unsafe {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values under the same lock.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    const ALL_UNSET: [(&str, Option<&str>); 4] = [
        ("LOTSIZER_STORE_PATH", None),
        ("LOTSIZER_ROUNDING", None),
        ("LOTSIZER_DEFAULT_INSTRUMENT", None),
        ("LOTSIZER_LOG_FILE", None),
    ];

    #[test]
    fn defaults_without_env_vars() {
        let mut vars = ALL_UNSET.to_vec();
        vars.push(("HOME", Some("/home/trader")));
        with_env(&vars, || {
            let config = fetch_config().unwrap();
            assert_eq!(
                config.store_path,
                PathBuf::from("/home/trader/.lotsizer/customInstruments.json")
            );
            assert_eq!(config.rounding, RoundingPolicy::LotFloored);
            assert_eq!(config.default_instrument, "SPX500");
            assert_eq!(
                config.log_file,
                PathBuf::from("/home/trader/.lotsizer/lotsizer.log")
            );
        });
    }

    #[test]
    fn store_in_working_dir_without_home() {
        let mut vars = ALL_UNSET.to_vec();
        vars.push(("HOME", None));
        with_env(&vars, || {
            let config = fetch_config().unwrap();
            assert_eq!(config.store_path, PathBuf::from("customInstruments.json"));
        });
    }

    #[test]
    fn reads_overrides_from_env() {
        with_env(
            &[
                ("LOTSIZER_STORE_PATH", Some("/data/instruments.json")),
                ("LOTSIZER_ROUNDING", Some("unrounded")),
                ("LOTSIZER_DEFAULT_INSTRUMENT", Some("EURUSD")),
                ("LOTSIZER_LOG_FILE", Some("/var/log/lotsizer.log")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.store_path, PathBuf::from("/data/instruments.json"));
                assert_eq!(config.rounding, RoundingPolicy::Unrounded);
                assert_eq!(config.default_instrument, "EURUSD");
                assert_eq!(config.log_file, PathBuf::from("/var/log/lotsizer.log"));
            },
        );
    }

    #[test]
    fn rejects_unknown_rounding() {
        with_env(&[("LOTSIZER_ROUNDING", Some("nearest"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("unknown rounding policy 'nearest'"));
        });
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[
                ("LOTSIZER_ROUNDING", Some("")),
                ("LOTSIZER_DEFAULT_INSTRUMENT", Some("")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.rounding, RoundingPolicy::LotFloored);
                assert_eq!(config.default_instrument, "SPX500");
            },
        );
    }
}
