//! Position sizing engine.
//!
//! Turns a risk budget, a stop-loss distance, and an instrument's economics
//! into a recommended trade volume through a fixed four-step pipeline:
//!
//! 1. `max_dollar_risk = capital × (risk_percentage / 100)`
//! 2. `risk_per_unit = dollar_cost_per_unit × stop_loss_points`
//! 3. `raw_trade_volume = max_dollar_risk / risk_per_unit`
//! 4. `volume = raw_trade_volume × unit_to_volume_conversion`
//!
//! Every intermediate is kept in [`CalculationResult`] for the audit
//! breakdown. The engine is pure: no state, no I/O.

pub mod breakdown;
pub mod input;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::InstrumentDefinition;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// How the step-4 volume becomes the recommended volume.
///
/// Chosen once per deployment; the two policies are not equivalent.
#[cfg_attr(
    feature = "python",
    pyo3::pyclass(frozen, eq, eq_int, hash, from_py_object)
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RoundingPolicy {
    /// `final_volume = volume`.
    Unrounded,
    /// `final_volume = floor(volume / lot) × lot`.
    #[default]
    LotFloored,
}

impl RoundingPolicy {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            RoundingPolicy::Unrounded => "unrounded",
            RoundingPolicy::LotFloored => "lot-floored",
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses `floored` (also `lot-floored` or `lot_floored`) and `unrounded`,
/// ignoring case and surrounding whitespace.
impl FromStr for RoundingPolicy {
    type Err = crate::LotsizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "floored" | "lot-floored" | "lot_floored" => Ok(Self::LotFloored),
            "unrounded" => Ok(Self::Unrounded),
            other => Err(crate::LotsizerError::Config(format!(
                "unknown rounding policy '{other}' (expected 'floored' or 'unrounded')"
            ))),
        }
    }
}

/// Source of the step-1 monetary risk budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBudget {
    /// A percentage (0 to 100) of account capital.
    PercentOfCapital {
        capital: Decimal,
        risk_percentage: Decimal,
    },
    /// A dollar amount entered directly.
    FixedAmount(Decimal),
}

impl RiskBudget {
    /// Builds a budget from optional capital/percentage or amount inputs.
    ///
    /// Exactly one of the two forms must be given, otherwise
    /// [`crate::LotsizerError::Usage`] is returned.
    pub fn from_parts(
        capital: Option<Decimal>,
        risk_percentage: Option<Decimal>,
        risk_amount: Option<Decimal>,
    ) -> crate::Result<Self> {
        match (capital, risk_percentage, risk_amount) {
            (Some(capital), Some(risk_percentage), None) => Ok(RiskBudget::PercentOfCapital {
                capital,
                risk_percentage,
            }),
            (None, None, Some(amount)) => Ok(RiskBudget::FixedAmount(amount)),
            _ => Err(crate::LotsizerError::Usage(
                "give capital with a risk percentage, or a risk amount alone".to_string(),
            )),
        }
    }

    /// Step 1, or `None` when the inputs cannot produce a budget.
    fn max_dollar_risk(&self) -> Option<Decimal> {
        match *self {
            RiskBudget::PercentOfCapital {
                capital,
                risk_percentage,
            } => {
                if capital <= Decimal::ZERO
                    || risk_percentage <= Decimal::ZERO
                    || risk_percentage > ONE_HUNDRED
                {
                    return None;
                }
                capital.checked_mul(risk_percentage.checked_div(ONE_HUNDRED)?)
            }
            RiskBudget::FixedAmount(amount) => (amount > Decimal::ZERO).then_some(amount),
        }
    }
}

/// Inputs to one sizing calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingParameters {
    pub risk: RiskBudget,
    pub stop_loss_points: Decimal,
    pub dollar_cost_per_unit: Decimal,
    pub unit_to_volume_conversion: Decimal,
    pub standard_lot_size: Decimal,
}

impl TradingParameters {
    /// Combines a risk budget and stop loss with a resolved instrument.
    pub fn for_instrument(
        risk: RiskBudget,
        stop_loss_points: Decimal,
        instrument: &InstrumentDefinition,
    ) -> Self {
        Self {
            risk,
            stop_loss_points,
            dollar_cost_per_unit: instrument.dollar_cost_per_unit,
            unit_to_volume_conversion: instrument.unit_to_volume_conversion,
            standard_lot_size: instrument.standard_lot_size,
        }
    }
}

/// Recommended volume with every intermediate of the pipeline.
#[cfg_attr(feature = "python", pyo3::pyclass(frozen, get_all, from_py_object))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationResult {
    /// Step 1: monetary risk budget.
    pub max_dollar_risk: Decimal,
    /// Step 2: dollar loss per unit if the stop is hit.
    pub risk_per_unit: Decimal,
    /// Step 3: units that spend exactly the budget.
    pub raw_trade_volume: Decimal,
    /// Step 4: units converted to volume, before rounding.
    pub volume: Decimal,
    /// Recommended volume after applying `policy`.
    pub final_volume: Decimal,
    pub policy: RoundingPolicy,
}

/// Runs the four-step pipeline.
///
/// Returns `Ok(None)` when the inputs are incomplete (any of capital,
/// risk percentage, stop loss, cost per unit, or conversion factor is not
/// strictly positive, the percentage exceeds 100, or the arithmetic
/// overflows). That is a normal "no result yet" state, not an error.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositive`] when `policy` is
/// [`RoundingPolicy::LotFloored`] and the lot size is not positive.
pub fn calculate(
    params: &TradingParameters,
    policy: RoundingPolicy,
) -> Result<Option<CalculationResult>, ValidationError> {
    let Some(max_dollar_risk) = params.risk.max_dollar_risk() else {
        return Ok(None);
    };
    if params.stop_loss_points <= Decimal::ZERO
        || params.dollar_cost_per_unit <= Decimal::ZERO
        || params.unit_to_volume_conversion <= Decimal::ZERO
    {
        return Ok(None);
    }
    if policy == RoundingPolicy::LotFloored && params.standard_lot_size <= Decimal::ZERO {
        return Err(ValidationError::NonPositive {
            field: "standard lot size",
            value: params.standard_lot_size,
        });
    }

    let Some(risk_per_unit) = params
        .dollar_cost_per_unit
        .checked_mul(params.stop_loss_points)
    else {
        return Ok(None);
    };
    let Some(raw_trade_volume) = max_dollar_risk.checked_div(risk_per_unit) else {
        return Ok(None);
    };
    let Some(volume) = raw_trade_volume.checked_mul(params.unit_to_volume_conversion) else {
        return Ok(None);
    };
    let Some(final_volume) = apply_policy(volume, params.standard_lot_size, policy) else {
        return Ok(None);
    };

    Ok(Some(CalculationResult {
        max_dollar_risk,
        risk_per_unit,
        raw_trade_volume,
        volume,
        final_volume,
        policy,
    }))
}

fn apply_policy(volume: Decimal, lot: Decimal, policy: RoundingPolicy) -> Option<Decimal> {
    match policy {
        RoundingPolicy::Unrounded => Some(volume),
        RoundingPolicy::LotFloored => volume.checked_div(lot)?.floor().checked_mul(lot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params(capital: Decimal, pct: Decimal, stop: Decimal) -> TradingParameters {
        TradingParameters {
            risk: RiskBudget::PercentOfCapital {
                capital,
                risk_percentage: pct,
            },
            stop_loss_points: stop,
            dollar_cost_per_unit: dec!(1.01),
            unit_to_volume_conversion: dec!(0.1),
            standard_lot_size: dec!(0.5),
        }
    }

    #[test]
    fn four_step_pipeline() {
        let result = calculate(&params(dec!(5000), dec!(1), dec!(12)), RoundingPolicy::Unrounded)
            .unwrap()
            .unwrap();
        assert_eq!(result.max_dollar_risk, dec!(50));
        assert_eq!(result.risk_per_unit, dec!(12.12));
        assert_eq!(result.raw_trade_volume, dec!(50) / dec!(12.12));
        assert_eq!(result.volume, result.raw_trade_volume * dec!(0.1));
        assert_eq!(result.final_volume, result.volume);
    }

    #[test]
    fn lot_floored_rounds_down() {
        let result = calculate(&params(dec!(5000), dec!(1), dec!(12)), RoundingPolicy::LotFloored)
            .unwrap()
            .unwrap();
        assert_eq!(result.final_volume, dec!(0));
        assert_eq!(result.policy, RoundingPolicy::LotFloored);
    }

    #[test]
    fn lot_floored_keeps_whole_lots() {
        // 100000 × 2% = 2000; 2000 / 12.12 × 0.1 ≈ 16.50; floor to 0.5 → 16.5
        let result = calculate(
            &params(dec!(100000), dec!(2), dec!(12)),
            RoundingPolicy::LotFloored,
        )
        .unwrap()
        .unwrap();
        assert!(result.volume > dec!(16.5) && result.volume < dec!(17));
        assert_eq!(result.final_volume, dec!(16.5));
    }

    #[test]
    fn fixed_amount_budget() {
        let p = TradingParameters {
            risk: RiskBudget::FixedAmount(dec!(60)),
            dollar_cost_per_unit: dec!(1.008),
            ..params(dec!(0), dec!(0), dec!(12))
        };
        let result = calculate(&p, RoundingPolicy::LotFloored).unwrap().unwrap();
        assert_eq!(result.max_dollar_risk, dec!(60));
        assert_eq!(result.risk_per_unit, dec!(12.096));
        assert_eq!(result.final_volume, dec!(0));
    }

    #[test]
    fn incomplete_inputs_yield_no_result() {
        let policy = RoundingPolicy::LotFloored;
        assert_eq!(calculate(&params(dec!(0), dec!(1), dec!(12)), policy), Ok(None));
        assert_eq!(calculate(&params(dec!(5000), dec!(0), dec!(12)), policy), Ok(None));
        assert_eq!(calculate(&params(dec!(5000), dec!(101), dec!(12)), policy), Ok(None));
        assert_eq!(calculate(&params(dec!(5000), dec!(1), dec!(-3)), policy), Ok(None));

        let no_cost = TradingParameters {
            dollar_cost_per_unit: dec!(0),
            ..params(dec!(5000), dec!(1), dec!(12))
        };
        assert_eq!(calculate(&no_cost, policy), Ok(None));

        let no_conversion = TradingParameters {
            unit_to_volume_conversion: dec!(-0.1),
            ..params(dec!(5000), dec!(1), dec!(12))
        };
        assert_eq!(calculate(&no_conversion, policy), Ok(None));

        let no_amount = TradingParameters {
            risk: RiskBudget::FixedAmount(dec!(0)),
            ..params(dec!(5000), dec!(1), dec!(12))
        };
        assert_eq!(calculate(&no_amount, policy), Ok(None));
    }

    #[test]
    fn non_positive_lot_size_under_flooring_is_invalid() {
        let p = TradingParameters {
            standard_lot_size: dec!(0),
            ..params(dec!(5000), dec!(1), dec!(12))
        };
        assert_eq!(
            calculate(&p, RoundingPolicy::LotFloored),
            Err(ValidationError::NonPositive {
                field: "standard lot size",
                value: dec!(0),
            })
        );
        // Unrounded never looks at the lot size.
        assert!(calculate(&p, RoundingPolicy::Unrounded).unwrap().is_some());
    }

    #[test]
    fn incomplete_input_wins_over_bad_lot_size() {
        let p = TradingParameters {
            standard_lot_size: dec!(0),
            ..params(dec!(0), dec!(1), dec!(12))
        };
        assert_eq!(calculate(&p, RoundingPolicy::LotFloored), Ok(None));
    }

    #[test]
    fn overflow_yields_no_result() {
        let p = TradingParameters {
            risk: RiskBudget::FixedAmount(Decimal::MAX),
            dollar_cost_per_unit: dec!(0.0000000001),
            stop_loss_points: dec!(0.0000000001),
            ..params(dec!(1), dec!(1), dec!(1))
        };
        assert_eq!(calculate(&p, RoundingPolicy::Unrounded), Ok(None));
    }

    #[test]
    fn for_instrument_copies_economics() {
        let spx = InstrumentDefinition::new("SPX500", dec!(1.008), dec!(0.1), dec!(0.5));
        let p = TradingParameters::for_instrument(RiskBudget::FixedAmount(dec!(60)), dec!(12), &spx);
        assert_eq!(p.dollar_cost_per_unit, dec!(1.008));
        assert_eq!(p.unit_to_volume_conversion, dec!(0.1));
        assert_eq!(p.standard_lot_size, dec!(0.5));
    }

    #[test]
    fn parse_rounding_policy() {
        assert_eq!("floored".parse::<RoundingPolicy>().unwrap(), RoundingPolicy::LotFloored);
        assert_eq!(
            " Lot-Floored ".parse::<RoundingPolicy>().unwrap(),
            RoundingPolicy::LotFloored
        );
        assert_eq!(
            "unrounded".parse::<RoundingPolicy>().unwrap(),
            RoundingPolicy::Unrounded
        );
        assert!("nearest".parse::<RoundingPolicy>().is_err());
    }
}
