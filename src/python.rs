//! PyO3 Python module definition.
//!
//! Exposes the sizing engine as a plain function and the instrument catalog
//! as a class backed by a JSON file store. Incomplete inputs come back as
//! `None`; invalid ones raise `ValueError`.

use std::path::PathBuf;

use pyo3::exceptions::{PyIOError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use rust_decimal::Decimal;

use crate::catalog::store::JsonFileStore;
use crate::catalog::{Catalog, SaveStatus};
use crate::models::InstrumentDefinition;
use crate::sizing::breakdown::render_breakdown;
use crate::sizing::{CalculationResult, RiskBudget, RoundingPolicy, TradingParameters, calculate};
use crate::LotsizerError;

impl From<LotsizerError> for PyErr {
    fn from(err: LotsizerError) -> Self {
        match err {
            LotsizerError::NotFound(name) => PyKeyError::new_err(name),
            LotsizerError::Io(msg) | LotsizerError::Store(msg) => PyIOError::new_err(msg),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

#[pymethods]
impl InstrumentDefinition {
    #[new]
    fn py_new(
        name: String,
        dollar_cost_per_unit: Decimal,
        unit_to_volume_conversion: Decimal,
        standard_lot_size: Decimal,
    ) -> PyResult<Self> {
        let def = Self::new(
            name,
            dollar_cost_per_unit,
            unit_to_volume_conversion,
            standard_lot_size,
        );
        def.validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(def)
    }

    fn __repr__(&self) -> String {
        format!(
            "InstrumentDefinition(name={:?}, dollar_cost_per_unit={}, unit_to_volume_conversion={}, standard_lot_size={})",
            self.name,
            self.dollar_cost_per_unit,
            self.unit_to_volume_conversion,
            self.standard_lot_size
        )
    }
}

/// Computes the recommended volume, or `None` while inputs are incomplete.
#[pyfunction]
#[pyo3(signature = (
    stop_loss_points,
    dollar_cost_per_unit,
    unit_to_volume_conversion,
    standard_lot_size,
    *,
    capital = None,
    risk_percentage = None,
    risk_amount = None,
    policy = RoundingPolicy::LotFloored,
))]
#[allow(clippy::too_many_arguments)]
fn calculate_volume(
    stop_loss_points: Decimal,
    dollar_cost_per_unit: Decimal,
    unit_to_volume_conversion: Decimal,
    standard_lot_size: Decimal,
    capital: Option<Decimal>,
    risk_percentage: Option<Decimal>,
    risk_amount: Option<Decimal>,
    policy: RoundingPolicy,
) -> PyResult<Option<CalculationResult>> {
    let params = TradingParameters {
        risk: RiskBudget::from_parts(capital, risk_percentage, risk_amount)?,
        stop_loss_points,
        dollar_cost_per_unit,
        unit_to_volume_conversion,
        standard_lot_size,
    };
    calculate(&params, policy).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Instrument catalog persisted to a JSON file.
#[pyclass(name = "Catalog")]
pub struct PyCatalog {
    inner: Catalog<JsonFileStore>,
}

#[pymethods]
impl PyCatalog {
    #[new]
    fn new(path: PathBuf) -> Self {
        Self {
            inner: Catalog::with_builtin_defaults(JsonFileStore::new(path)),
        }
    }

    fn resolve(&self, name: &str) -> PyResult<InstrumentDefinition> {
        Ok(self.inner.resolve(name)?.clone())
    }

    fn list_names(&self) -> Vec<String> {
        self.inner.list_names().into_iter().map(String::from).collect()
    }

    /// Badge for `name`: "Default", "Modified" or "Custom".
    fn provenance(&self, name: &str) -> PyResult<&'static str> {
        self.inner
            .entry(name)
            .map(|e| e.provenance.label())
            .ok_or_else(|| PyKeyError::new_err(name.to_string()))
    }

    fn is_shadow_of_default(&self, name: &str) -> bool {
        self.inner.is_shadow_of_default(name)
    }

    /// Returns whether the change was written to disk.
    fn add(&mut self, definition: InstrumentDefinition) -> PyResult<bool> {
        Ok(persisted(self.inner.add(definition)?))
    }

    /// Returns whether the change was written to disk.
    fn edit_numeric_fields(
        &mut self,
        name: &str,
        dollar_cost_per_unit: Decimal,
        unit_to_volume_conversion: Decimal,
    ) -> PyResult<bool> {
        Ok(persisted(self.inner.edit_numeric_fields(
            name,
            dollar_cost_per_unit,
            unit_to_volume_conversion,
        )?))
    }

    /// Returns whether the change was written to disk.
    fn remove(&mut self, name: &str) -> bool {
        persisted(self.inner.remove(name))
    }

    /// Sizes a trade with `name`'s economics and returns the breakdown lines.
    #[pyo3(signature = (
        name,
        stop_loss_points,
        *,
        capital = None,
        risk_percentage = None,
        risk_amount = None,
        policy = RoundingPolicy::LotFloored,
    ))]
    fn breakdown(
        &self,
        name: &str,
        stop_loss_points: Decimal,
        capital: Option<Decimal>,
        risk_percentage: Option<Decimal>,
        risk_amount: Option<Decimal>,
        policy: RoundingPolicy,
    ) -> PyResult<Option<Vec<String>>> {
        let instrument = self.inner.resolve(name)?;
        let risk = RiskBudget::from_parts(capital, risk_percentage, risk_amount)?;
        let params = TradingParameters::for_instrument(risk, stop_loss_points, instrument);
        let result = calculate(&params, policy).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.map(|r| render_breakdown(&r, &params)))
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, name: &str) -> bool {
        self.inner.contains(name)
    }
}

fn persisted(status: SaveStatus) -> bool {
    matches!(status, SaveStatus::Saved)
}

#[pymodule]
fn lotsizer(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<InstrumentDefinition>()?;
    m.add_class::<CalculationResult>()?;
    m.add_class::<RoundingPolicy>()?;
    m.add_class::<PyCatalog>()?;
    m.add_function(wrap_pyfunction!(calculate_volume, m)?)?;
    Ok(())
}
