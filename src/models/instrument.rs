//! Instrument definitions and the built-in default table.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Name of the instrument selected when nothing else is available.
pub const FALLBACK_INSTRUMENT: &str = "SPX500";

/// Economic parameters of one tradable instrument.
///
/// Serialized with camelCase keys and numeric values so the persisted
/// blob reads `{"name": "GOLD", "dollarCostPerUnit": 0.5, ...}`.
/// Deserialization accepts numbers or numeric strings.
#[cfg_attr(feature = "python", pyo3::pyclass(frozen, get_all, from_py_object))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDefinition {
    /// Catalog key. Case-sensitive.
    pub name: String,
    /// Dollar value of one point of price movement for one unit.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub dollar_cost_per_unit: Decimal,
    /// Factor converting units into tradable volume (lots).
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_to_volume_conversion: Decimal,
    /// Volume granularity; floored results land on multiples of this.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub standard_lot_size: Decimal,
}

impl InstrumentDefinition {
    /// Creates a definition without validating it.
    pub fn new(
        name: impl Into<String>,
        dollar_cost_per_unit: Decimal,
        unit_to_volume_conversion: Decimal,
        standard_lot_size: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            dollar_cost_per_unit,
            unit_to_volume_conversion,
            standard_lot_size,
        }
    }

    /// Checks the name is non-empty and every numeric field is positive and
    /// storable without loss.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered, checking the name
    /// first and then the numeric fields in declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        require_amount("dollar cost per unit", self.dollar_cost_per_unit)?;
        require_amount("unit-to-volume conversion", self.unit_to_volume_conversion)?;
        require_amount("standard lot size", self.standard_lot_size)?;
        Ok(())
    }
}

/// Rejects zero, negative and unstorable values for the named field.
///
/// The store writes amounts as JSON floats, so a value is only accepted if
/// it reads back unchanged.
pub(crate) fn require_amount(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositive { field, value });
    }
    if !survives_float(value) {
        return Err(ValidationError::TooPrecise { field, value });
    }
    Ok(())
}

/// Whether `value` comes back equal after `Decimal -> f64 -> Decimal`.
fn survives_float(value: Decimal) -> bool {
    value
        .to_f64()
        .filter(|f| f.is_finite())
        .and_then(|f| Decimal::from_str(&f.to_string()).ok())
        .is_some_and(|back| back == value)
}

/// Built-in instruments in their declared display order.
pub fn builtin_defaults() -> Vec<InstrumentDefinition> {
    vec![
        InstrumentDefinition::new(
            "SPX500",
            Decimal::new(1008, 3),
            Decimal::new(1, 1),
            Decimal::new(5, 1),
        ),
        InstrumentDefinition::new(
            "NAS100",
            Decimal::new(25, 2),
            Decimal::new(1, 1),
            Decimal::new(5, 1),
        ),
        InstrumentDefinition::new(
            "EURUSD",
            Decimal::new(10, 1),
            Decimal::new(1, 2),
            Decimal::new(1, 2),
        ),
        InstrumentDefinition::new(
            "GBPUSD",
            Decimal::new(10, 1),
            Decimal::new(1, 2),
            Decimal::new(1, 2),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn gold() -> InstrumentDefinition {
        InstrumentDefinition::new("GOLD", dec!(0.5), dec!(0.1), dec!(0.1))
    }

    #[test]
    fn valid_definition_passes() {
        assert_eq!(gold().validate(), Ok(()));
    }

    #[test]
    fn reject_empty_name() {
        let def = InstrumentDefinition {
            name: "   ".to_string(),
            ..gold()
        };
        assert_eq!(def.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn reject_precision_lost_in_storage() {
        let def = InstrumentDefinition {
            dollar_cost_per_unit: dec!(0.1234567890123456789),
            ..gold()
        };
        assert_eq!(
            def.validate(),
            Err(ValidationError::TooPrecise {
                field: "dollar cost per unit",
                value: dec!(0.1234567890123456789),
            })
        );
    }

    #[test]
    fn defaults_are_storable() {
        for def in builtin_defaults() {
            assert_eq!(def.validate(), Ok(()), "{}", def.name);
        }
        let fine = InstrumentDefinition {
            unit_to_volume_conversion: dec!(0.123456789),
            ..gold()
        };
        assert_eq!(fine.validate(), Ok(()));
    }

    #[test]
    fn reject_zero_lot_size() {
        let def = InstrumentDefinition {
            standard_lot_size: dec!(0),
            ..gold()
        };
        assert!(matches!(
            def.validate(),
            Err(ValidationError::NonPositive {
                field: "standard lot size",
                ..
            })
        ));
    }

    #[test]
    fn reject_negative_cost() {
        let def = InstrumentDefinition {
            dollar_cost_per_unit: dec!(-1),
            ..gold()
        };
        assert!(matches!(
            def.validate(),
            Err(ValidationError::NonPositive {
                field: "dollar cost per unit",
                ..
            })
        ));
    }

    #[test]
    fn serializes_numbers_with_camel_case_keys() {
        let json = serde_json::to_string(&gold()).unwrap();
        assert_eq!(
            json,
            r#"{"name":"GOLD","dollarCostPerUnit":0.5,"unitToVolumeConversion":0.1,"standardLotSize":0.1}"#
        );
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let def: InstrumentDefinition = serde_json::from_str(
            r#"{"name":"SPX500","dollarCostPerUnit":1.008,"unitToVolumeConversion":"0.1","standardLotSize":0.5}"#,
        )
        .unwrap();
        assert_eq!(def.dollar_cost_per_unit, dec!(1.008));
        assert_eq!(def.unit_to_volume_conversion, dec!(0.1));
        assert_eq!(def.standard_lot_size, dec!(0.5));
    }

    #[test]
    fn builtin_defaults_are_valid_and_ordered() {
        let defaults = builtin_defaults();
        let names: Vec<&str> = defaults.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["SPX500", "NAS100", "EURUSD", "GBPUSD"]);
        assert!(defaults.iter().all(|d| d.validate().is_ok()));
        assert_eq!(defaults[0].standard_lot_size, dec!(0.5));
        assert_eq!(defaults[0].dollar_cost_per_unit, dec!(1.008));
    }
}
