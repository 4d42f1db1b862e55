//! Raw text input to trading parameters.
//!
//! Form fields arrive as free text. Anything blank or unparseable means
//! the user has not finished typing, so conversion yields `None` rather
//! than an error.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::{RiskBudget, RoundingPolicy, TradingParameters};
use crate::models::InstrumentDefinition;

/// Parses a decimal amount, accepting plain or scientific notation.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Whether the risk field holds a percentage or a dollar amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RiskMode {
    #[default]
    PercentOfCapital,
    FixedAmount,
}

impl RiskMode {
    /// Toggles between modes.
    pub fn toggle(&mut self) {
        *self = match self {
            RiskMode::PercentOfCapital => RiskMode::FixedAmount,
            RiskMode::FixedAmount => RiskMode::PercentOfCapital,
        };
    }

    /// Returns the label for the risk field.
    pub fn label(&self) -> &'static str {
        match self {
            RiskMode::PercentOfCapital => "Risk (% of capital)",
            RiskMode::FixedAmount => "Risk ($)",
        }
    }
}

/// Borrowed view of the calculator's text fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct SizingForm<'a> {
    pub risk_mode: RiskMode,
    pub capital: &'a str,
    pub risk: &'a str,
    pub stop_loss_points: &'a str,
    pub dollar_cost_per_unit: &'a str,
    pub unit_to_volume_conversion: &'a str,
    pub standard_lot_size: &'a str,
}

impl SizingForm<'_> {
    /// Converts the form into parameters, or `None` while incomplete.
    ///
    /// Capital is ignored in fixed-amount mode. The lot size may be blank
    /// under [`RoundingPolicy::Unrounded`], which never reads it.
    pub fn to_parameters(&self, policy: RoundingPolicy) -> Option<TradingParameters> {
        let risk = match self.risk_mode {
            RiskMode::PercentOfCapital => RiskBudget::PercentOfCapital {
                capital: parse_amount(self.capital)?,
                risk_percentage: parse_amount(self.risk)?,
            },
            RiskMode::FixedAmount => RiskBudget::FixedAmount(parse_amount(self.risk)?),
        };
        let standard_lot_size = match (parse_amount(self.standard_lot_size), policy) {
            (Some(lot), _) => lot,
            (None, RoundingPolicy::Unrounded) => Decimal::ZERO,
            (None, RoundingPolicy::LotFloored) => return None,
        };

        Some(TradingParameters {
            risk,
            stop_loss_points: parse_amount(self.stop_loss_points)?,
            dollar_cost_per_unit: parse_amount(self.dollar_cost_per_unit)?,
            unit_to_volume_conversion: parse_amount(self.unit_to_volume_conversion)?,
            standard_lot_size,
        })
    }
}

/// Text shown in the instrument fields when `instrument` is selected.
pub fn instrument_field_text(instrument: &InstrumentDefinition) -> [String; 3] {
    [
        instrument.dollar_cost_per_unit.normalize().to_string(),
        instrument.unit_to_volume_conversion.normalize().to_string(),
        instrument.standard_lot_size.normalize().to_string(),
    ]
}
