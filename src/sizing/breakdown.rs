//! Audit breakdown of a sizing calculation.

use rust_decimal::{Decimal, RoundingStrategy};

use super::{CalculationResult, RiskBudget, RoundingPolicy, TradingParameters};

/// One labelled line of the breakdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakdownStep {
    pub label: &'static str,
    /// The value produced by this step.
    pub value: Decimal,
    /// How the value was obtained, formatted for display.
    pub detail: String,
}

impl CalculationResult {
    /// The pipeline's intermediates in order, ending with the final volume.
    pub fn steps(&self, params: &TradingParameters) -> Vec<BreakdownStep> {
        let step1_detail = match params.risk {
            RiskBudget::PercentOfCapital {
                capital,
                risk_percentage,
            } => format!(
                "{}% of ${} = ${}",
                risk_percentage.normalize(),
                fixed(capital, 2),
                fixed(self.max_dollar_risk, 2)
            ),
            RiskBudget::FixedAmount(_) => format!("${}", fixed(self.max_dollar_risk, 2)),
        };

        let (final_label, final_detail) = match self.policy {
            RoundingPolicy::LotFloored => (
                "Final: Rounded to Lot Size",
                format!(
                    "{} lots (lot size {})",
                    fixed(self.final_volume, 2),
                    params.standard_lot_size.normalize()
                ),
            ),
            RoundingPolicy::Unrounded => (
                "Final: Unrounded Volume",
                format!("{} lots", fixed(self.final_volume, 3)),
            ),
        };

        vec![
            BreakdownStep {
                label: "Step 1: Maximum Dollar Risk",
                value: self.max_dollar_risk,
                detail: step1_detail,
            },
            BreakdownStep {
                label: "Step 2: Dollar Cost of Stop Loss",
                value: self.risk_per_unit,
                detail: format!(
                    "{} pts × ${} = ${}",
                    params.stop_loss_points.normalize(),
                    params.dollar_cost_per_unit.normalize(),
                    fixed(self.risk_per_unit, 2)
                ),
            },
            BreakdownStep {
                label: "Step 3: Required Trade Units",
                value: self.raw_trade_volume,
                detail: format!(
                    "${} ÷ ${} = {} units",
                    fixed(self.max_dollar_risk, 2),
                    fixed(self.risk_per_unit, 2),
                    fixed(self.raw_trade_volume, 2)
                ),
            },
            BreakdownStep {
                label: "Step 4: Convert to Volume",
                value: self.volume,
                detail: format!(
                    "{} × {} = {} volume",
                    fixed(self.raw_trade_volume, 2),
                    params.unit_to_volume_conversion.normalize(),
                    fixed(self.volume, 3)
                ),
            },
            BreakdownStep {
                label: final_label,
                value: self.final_volume,
                detail: final_detail,
            },
        ]
    }
}

/// Formats `value` with exactly `dp` decimal places, rounding half away
/// from zero.
pub fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Renders the breakdown as `label  detail` lines for plain-text output.
pub fn render_breakdown(result: &CalculationResult, params: &TradingParameters) -> Vec<String> {
    result
        .steps(params)
        .into_iter()
        .map(|step| format!("{}  {}", step.label, step.detail))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::calculate;
    use rust_decimal_macros::dec;

    fn scenario() -> TradingParameters {
        TradingParameters {
            risk: RiskBudget::PercentOfCapital {
                capital: dec!(5000),
                risk_percentage: dec!(1),
            },
            stop_loss_points: dec!(12),
            dollar_cost_per_unit: dec!(1.01),
            unit_to_volume_conversion: dec!(0.1),
            standard_lot_size: dec!(0.5),
        }
    }

    #[test]
    fn breakdown_lines_match_layout() {
        let params = scenario();
        let result = calculate(&params, RoundingPolicy::LotFloored)
            .unwrap()
            .unwrap();
        let lines = render_breakdown(&result, &params);
        assert_eq!(
            lines,
            [
                "Step 1: Maximum Dollar Risk  1% of $5000.00 = $50.00",
                "Step 2: Dollar Cost of Stop Loss  12 pts × $1.01 = $12.12",
                "Step 3: Required Trade Units  $50.00 ÷ $12.12 = 4.13 units",
                "Step 4: Convert to Volume  4.13 × 0.1 = 0.413 volume",
                "Final: Rounded to Lot Size  0.00 lots (lot size 0.5)",
            ]
        );
    }

    #[test]
    fn steps_carry_exact_values() {
        let params = scenario();
        let result = calculate(&params, RoundingPolicy::Unrounded)
            .unwrap()
            .unwrap();
        let steps = result.steps(&params);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].value, result.max_dollar_risk);
        assert_eq!(steps[1].value, result.risk_per_unit);
        assert_eq!(steps[2].value, result.raw_trade_volume);
        assert_eq!(steps[3].value, result.volume);
        assert_eq!(steps[4].value, result.final_volume);
        assert_eq!(steps[4].label, "Final: Unrounded Volume");
        assert_eq!(steps[4].detail, "0.413 lots");
    }

    #[test]
    fn fixed_pads_and_rounds_half_up() {
        assert_eq!(fixed(dec!(5000), 2), "5000.00");
        assert_eq!(fixed(dec!(0.125), 2), "0.13");
        assert_eq!(fixed(dec!(12.096), 2), "12.10");
    }

    #[test]
    fn fixed_amount_step_one() {
        let params = TradingParameters {
            risk: RiskBudget::FixedAmount(dec!(60)),
            dollar_cost_per_unit: dec!(1.008),
            ..scenario()
        };
        let result = calculate(&params, RoundingPolicy::LotFloored)
            .unwrap()
            .unwrap();
        let steps = result.steps(&params);
        assert_eq!(steps[0].detail, "$60.00");
        assert_eq!(steps[1].detail, "12 pts × $1.008 = $12.10");
    }
}
