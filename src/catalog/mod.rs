//! Instrument catalog: built-in defaults merged with user overrides.
//!
//! Entries live in a single ordered structure populated defaults-first,
//! with persisted overrides applied in place. An override sharing a
//! default's name shadows it; any other override is a pure addition.
//! Every mutation hands the override snapshot to the injected
//! [`InstrumentStore`]; store failures are logged and never roll back the
//! in-memory state.

pub mod store;

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::models::instrument::require_amount;
use crate::models::{InstrumentDefinition, builtin_defaults};
use crate::{LotsizerError, Result};
use store::InstrumentStore;

/// Where an entry's current definition comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Built-in values, untouched.
    Default,
    /// User values shadowing the default named `base`.
    Override { base: String },
    /// User-defined instrument with no default counterpart.
    Addition,
}

impl Provenance {
    /// Short badge for list displays.
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Default => "Default",
            Provenance::Override { .. } => "Modified",
            Provenance::Addition => "Custom",
        }
    }

    /// Whether the entry is backed by the override layer.
    pub fn is_user_defined(&self) -> bool {
        !matches!(self, Provenance::Default)
    }
}

/// A resolved catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub definition: InstrumentDefinition,
    pub provenance: Provenance,
}

/// Outcome of persisting a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum SaveStatus {
    /// The mutation was applied and the snapshot written.
    Saved,
    /// Nothing changed, so nothing was written.
    Unchanged,
    /// The mutation was applied in memory but the store rejected it.
    Failed(String),
}

/// Authoritative mapping from instrument name to its effective definition.
pub struct Catalog<S: InstrumentStore> {
    defaults: Vec<InstrumentDefinition>,
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    store: S,
}

impl<S: InstrumentStore> Catalog<S> {
    /// Builds a catalog from `defaults` and the overrides held by `store`.
    ///
    /// A store that fails to load, or whose snapshot contains an invalid
    /// record, contributes no overrides. The failure is logged.
    pub fn load(defaults: Vec<InstrumentDefinition>, store: S) -> Self {
        let mut catalog = Self {
            defaults: Vec::with_capacity(defaults.len()),
            entries: Vec::with_capacity(defaults.len()),
            index: HashMap::new(),
            store,
        };

        for definition in defaults {
            if catalog.index.contains_key(&definition.name) {
                warn!(name = %definition.name, "duplicate default instrument ignored");
                continue;
            }
            catalog
                .index
                .insert(definition.name.clone(), catalog.entries.len());
            catalog.entries.push(CatalogEntry {
                definition: definition.clone(),
                provenance: Provenance::Default,
            });
            catalog.defaults.push(definition);
        }

        match catalog.store.load() {
            Ok(overrides) => {
                if let Some(bad) = overrides.iter().find_map(|d| d.validate().err()) {
                    warn!(error = %bad, "invalid instrument snapshot, ignoring stored overrides");
                } else {
                    let count = overrides.len();
                    for definition in overrides {
                        catalog.upsert(definition);
                    }
                    info!(count, "loaded instrument overrides");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to load instrument overrides, starting with none");
            }
        }

        catalog
    }

    /// Builds a catalog over the built-in default table.
    pub fn with_builtin_defaults(store: S) -> Self {
        Self::load(builtin_defaults(), store)
    }

    /// Read-only access to the persistence port.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the override if present, else the default.
    ///
    /// # Errors
    ///
    /// Returns [`LotsizerError::NotFound`] if neither exists.
    pub fn resolve(&self, name: &str) -> Result<&InstrumentDefinition> {
        self.entry(name)
            .map(|entry| &entry.definition)
            .ok_or_else(|| LotsizerError::NotFound(name.to_string()))
    }

    /// Returns the entry for `name` together with its provenance.
    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Names in display order: defaults as declared, then additions.
    pub fn list_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.definition.name.as_str())
            .collect()
    }

    /// Entries in display order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of instruments, defaults included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Whether `name` is one of the built-in defaults.
    pub fn is_default(&self, name: &str) -> bool {
        self.default_for(name).is_some()
    }

    /// True iff `name` is a default and an override currently shadows it.
    pub fn is_shadow_of_default(&self, name: &str) -> bool {
        matches!(
            self.entry(name).map(|e| &e.provenance),
            Some(Provenance::Override { .. })
        )
    }

    /// The override layer in display order. This is what gets persisted.
    pub fn overrides(&self) -> Vec<InstrumentDefinition> {
        self.entries
            .iter()
            .filter(|e| e.provenance.is_user_defined())
            .map(|e| e.definition.clone())
            .collect()
    }

    /// Inserts or replaces the override for `definition.name`.
    ///
    /// # Errors
    ///
    /// Returns [`LotsizerError::Validation`] if the name is empty or any
    /// numeric field is non-positive. Nothing is changed in that case.
    pub fn add(&mut self, definition: InstrumentDefinition) -> Result<SaveStatus> {
        definition.validate()?;
        info!(name = %definition.name, "adding instrument override");
        self.upsert(definition);
        Ok(self.persist())
    }

    /// Updates cost-per-unit and conversion factor for `name`.
    ///
    /// Editing a pure default materializes a shadow override carrying the
    /// default's lot size; the default table itself is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`LotsizerError::Validation`] for non-positive or unstorable
    /// values and
    /// [`LotsizerError::NotFound`] for an unknown name.
    pub fn edit_numeric_fields(
        &mut self,
        name: &str,
        dollar_cost_per_unit: Decimal,
        unit_to_volume_conversion: Decimal,
    ) -> Result<SaveStatus> {
        require_amount("dollar cost per unit", dollar_cost_per_unit)?;
        require_amount("unit-to-volume conversion", unit_to_volume_conversion)?;

        let &i = self
            .index
            .get(name)
            .ok_or_else(|| LotsizerError::NotFound(name.to_string()))?;

        let entry = &mut self.entries[i];
        if entry.provenance == Provenance::Default {
            debug!(name, "creating shadow override for default");
            entry.provenance = Provenance::Override {
                base: name.to_string(),
            };
        }
        entry.definition.dollar_cost_per_unit = dollar_cost_per_unit;
        entry.definition.unit_to_volume_conversion = unit_to_volume_conversion;

        info!(name, "edited instrument parameters");
        Ok(self.persist())
    }

    /// Deletes the override for `name`.
    ///
    /// An addition disappears from the catalog; a shadow reverts to its
    /// default. Removing a name without an override is a no-op.
    pub fn remove(&mut self, name: &str) -> SaveStatus {
        let Some(&i) = self.index.get(name) else {
            debug!(name, "remove of unknown instrument ignored");
            return SaveStatus::Unchanged;
        };

        match self.entries[i].provenance {
            Provenance::Default => return SaveStatus::Unchanged,
            Provenance::Override { .. } => {
                let Some(default) = self.default_for(name).cloned() else {
                    return SaveStatus::Unchanged;
                };
                info!(name, "resetting instrument to default");
                self.entries[i] = CatalogEntry {
                    definition: default,
                    provenance: Provenance::Default,
                };
            }
            Provenance::Addition => {
                info!(name, "removing custom instrument");
                self.entries.remove(i);
                self.reindex();
            }
        }

        self.persist()
    }

    fn default_for(&self, name: &str) -> Option<&InstrumentDefinition> {
        self.defaults.iter().find(|d| d.name == name)
    }

    /// Applies `definition` in place without persisting.
    fn upsert(&mut self, definition: InstrumentDefinition) {
        let provenance = if self.is_default(&definition.name) {
            Provenance::Override {
                base: definition.name.clone(),
            }
        } else {
            Provenance::Addition
        };

        match self.index.get(&definition.name) {
            Some(&i) => {
                self.entries[i] = CatalogEntry {
                    definition,
                    provenance,
                };
            }
            None => {
                self.index
                    .insert(definition.name.clone(), self.entries.len());
                self.entries.push(CatalogEntry {
                    definition,
                    provenance,
                });
            }
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.definition.name.clone(), i))
            .collect();
    }

    fn persist(&mut self) -> SaveStatus {
        let snapshot = self.overrides();
        match self.store.save(&snapshot) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                error!(error = %e, "failed to save instrument overrides");
                SaveStatus::Failed(e.to_string())
            }
        }
    }
}
