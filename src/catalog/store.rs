//! Persistence port for the catalog's override layer.
//!
//! The store keeps a single named blob holding a JSON array of
//! [`InstrumentDefinition`] records. A missing blob reads as an empty set.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::InstrumentDefinition;
use crate::{LotsizerError, Result};

/// Key under which the override blob is stored.
pub const STORE_KEY: &str = "customInstruments";

/// Load/save boundary between the catalog and local storage.
pub trait InstrumentStore {
    /// Reads the persisted override set.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be read or parsed.
    fn load(&self) -> Result<Vec<InstrumentDefinition>>;

    /// Replaces the persisted override set.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save(&mut self, instruments: &[InstrumentDefinition]) -> Result<()>;
}

impl<S: InstrumentStore + ?Sized> InstrumentStore for Box<S> {
    fn load(&self) -> Result<Vec<InstrumentDefinition>> {
        (**self).load()
    }

    fn save(&mut self, instruments: &[InstrumentDefinition]) -> Result<()> {
        (**self).save(instruments)
    }
}

/// Stores the override blob as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for the standard blob name inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{STORE_KEY}.json")))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InstrumentStore for JsonFileStore {
    fn load(&self) -> Result<Vec<InstrumentDefinition>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no instrument store yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(LotsizerError::Store(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        parse_blob(&contents)
    }

    fn save(&mut self, instruments: &[InstrumentDefinition]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                LotsizerError::Store(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(instruments)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| LotsizerError::Store(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            LotsizerError::Store(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), count = instruments.len(), "saved instrument store");
        Ok(())
    }
}

/// Keeps the override blob in memory as serialized JSON.
///
/// Used for ephemeral sessions and tests. Seed it with raw contents to
/// exercise the corrupt-blob path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
    saves: usize,
}

impl MemoryStore {
    /// Creates an empty store (no blob).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose blob holds `raw` verbatim.
    pub fn with_blob(raw: impl Into<String>) -> Self {
        Self {
            blob: Some(raw.into()),
            saves: 0,
        }
    }

    /// Returns the raw blob, if one has been written.
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Number of successful saves since creation.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl InstrumentStore for MemoryStore {
    fn load(&self) -> Result<Vec<InstrumentDefinition>> {
        match &self.blob {
            Some(raw) => parse_blob(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, instruments: &[InstrumentDefinition]) -> Result<()> {
        self.blob = Some(serde_json::to_string(instruments)?);
        self.saves += 1;
        Ok(())
    }
}

/// Parses a blob into definitions. Blank contents read as an empty set.
fn parse_blob(raw: &str) -> Result<Vec<InstrumentDefinition>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let instruments: Vec<InstrumentDefinition> = serde_json::from_str(raw)?;
    Ok(instruments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn gold() -> InstrumentDefinition {
        InstrumentDefinition::new("GOLD", dec!(0.5), dec!(0.1), dec!(0.1))
    }

    #[test]
    fn memory_store_starts_empty() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());
        assert!(store.blob().is_none());
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        store.save(&[gold()]).unwrap();
        assert_eq!(store.load().unwrap(), vec![gold()]);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        let store = MemoryStore::with_blob("{not json");
        assert!(matches!(store.load(), Err(LotsizerError::Json(_))));
    }

    #[test]
    fn blank_blob_reads_empty() {
        let store = MemoryStore::with_blob("  \n");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn boxed_store_delegates() {
        let mut store: Box<dyn InstrumentStore> = Box::new(MemoryStore::new());
        store.save(&[gold()]).unwrap();
        assert_eq!(store.load().unwrap(), vec![gold()]);
    }

    #[test]
    fn in_dir_uses_store_key() {
        let store = JsonFileStore::in_dir(Path::new("/tmp/lotsizer"));
        assert_eq!(
            store.path(),
            Path::new("/tmp/lotsizer/customInstruments.json")
        );
    }
}
