//! Capital-gains tax (yangdo-se) on the property being sold.
//!
//! # Computation
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Raw gain = sale price − acquisition price (no tax when ≤ 0) |
//! | 2    | Taxable gain: zero for an exempt one-household sale at or below the ceiling, otherwise pro-rated by the share of the price above the ceiling |
//! | 3    | Long-term holding deduction rate, capped (80%) |
//! | 4    | Tax base = taxable gain × (1 − deduction rate) − basic deduction |
//! | 5    | Progressive schedule: base × rate − progressive deduction |
//! | 6    | × local income tax multiplier (1.10) |
//!
//! # Example
//!
//! ```
//! use bridge_core::SimulationConfig;
//! use bridge_core::calculations::{CapitalGainsCalculator, CapitalGainsInput};
//! use bridge_core::Manwon;
//! use rust_decimal_macros::dec;
//!
//! let config = SimulationConfig::korea_2025();
//! let calculator = CapitalGainsCalculator::new(&config.capital_gains);
//!
//! // A second home held for two years: no exemption, no long-term deduction.
//! let breakdown = calculator.calculate(&CapitalGainsInput {
//!     sale_price: Manwon::new(dec!(50000)),
//!     acquisition_price: Manwon::new(dec!(45000)),
//!     holding_years: 2,
//!     residing_years: 0,
//!     is_one_house: false,
//!     in_regulated_area: false,
//! });
//!
//! // (5000 − 250) × 24% − 522 = 618, × 1.1
//! assert_eq!(breakdown.total_tax, Manwon::new(dec!(679.8)));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::Manwon;
use crate::models::{CapitalGainsConfig, SimulatorInputs};

const ONE_HOUSE_RATE_PER_YEAR: Decimal = dec!(0.04);
const GENERAL_RATE_PER_YEAR: Decimal = dec!(0.02);
const MIN_HOLDING_YEARS: u32 = 3;
const MIN_RESIDING_YEARS: u32 = 2;

/// The selling-side facts the tax depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsInput {
    pub sale_price: Manwon,
    pub acquisition_price: Manwon,
    pub holding_years: u32,
    pub residing_years: u32,
    pub is_one_house: bool,
    /// Does not change the result under the general-rate schedule.
    pub in_regulated_area: bool,
}

impl From<&SimulatorInputs> for CapitalGainsInput {
    fn from(inputs: &SimulatorInputs) -> Self {
        Self {
            sale_price: inputs.current_house_price,
            acquisition_price: inputs.current_house_acq_price,
            holding_years: inputs.holding_years,
            residing_years: inputs.residing_years,
            is_one_house: inputs.is_one_house,
            in_regulated_area: inputs.in_regulated_area,
        }
    }
}

/// Each intermediate figure of the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsBreakdown {
    /// Sale minus acquisition price; may be negative (losses are not deducted).
    pub raw_gain: Manwon,
    pub taxable_gain: Manwon,
    pub long_term_deduction_rate: Decimal,
    pub tax_base: Manwon,
    /// Tax from the progressive schedule before the local surtax.
    pub national_tax: Manwon,
    /// National tax including local income tax.
    pub total_tax: Manwon,
}

impl CapitalGainsBreakdown {
    fn untaxed(raw_gain: Manwon) -> Self {
        Self {
            raw_gain,
            taxable_gain: Manwon::ZERO,
            long_term_deduction_rate: Decimal::ZERO,
            tax_base: Manwon::ZERO,
            national_tax: Manwon::ZERO,
            total_tax: Manwon::ZERO,
        }
    }
}

/// Calculator for the capital-gains tax on the sold property.
#[derive(Debug, Clone)]
pub struct CapitalGainsCalculator<'a> {
    config: &'a CapitalGainsConfig,
}

impl<'a> CapitalGainsCalculator<'a> {
    pub fn new(config: &'a CapitalGainsConfig) -> Self {
        Self { config }
    }

    /// Runs every step and returns the breakdown.
    ///
    /// Intermediate values are floored at zero between steps, so the total
    /// is never negative.
    pub fn calculate(
        &self,
        input: &CapitalGainsInput,
    ) -> CapitalGainsBreakdown {
        let raw_gain = input.sale_price - input.acquisition_price;
        if raw_gain <= Manwon::ZERO {
            return CapitalGainsBreakdown::untaxed(raw_gain);
        }

        let taxable_gain = self.taxable_gain(raw_gain, input.sale_price, input.is_one_house);
        if taxable_gain <= Manwon::ZERO {
            return CapitalGainsBreakdown::untaxed(raw_gain);
        }

        let long_term_deduction_rate = self.long_term_deduction_rate(
            input.holding_years,
            input.residing_years,
            input.is_one_house,
        );
        let tax_base = self.tax_base(taxable_gain, long_term_deduction_rate);
        let national_tax = self.progressive_tax(tax_base);
        let total_tax = self.with_local_tax(national_tax);

        CapitalGainsBreakdown {
            raw_gain,
            taxable_gain,
            long_term_deduction_rate,
            tax_base,
            national_tax,
            total_tax,
        }
    }

    /// Applies the one-household exemption.
    ///
    /// Above the ceiling only the fraction of the gain matching the share of
    /// the price over the ceiling is taxed, so there is no cliff at the ceiling.
    fn taxable_gain(
        &self,
        raw_gain: Manwon,
        sale_price: Manwon,
        is_one_house: bool,
    ) -> Manwon {
        if !is_one_house {
            return raw_gain;
        }
        let ceiling = self.config.exemption_ceiling;
        if sale_price <= ceiling {
            return Manwon::ZERO;
        }
        match (sale_price - ceiling).ratio_to(sale_price) {
            Some(taxable_share) => raw_gain * taxable_share,
            None => Manwon::ZERO,
        }
    }

    /// Long-term holding deduction rate.
    ///
    /// One-household sellers who resided at least two years get 4% per year
    /// held plus 4% per year resided; everyone else gets 2% per year held.
    /// Both need three years of holding. Capped at the configured maximum.
    fn long_term_deduction_rate(
        &self,
        holding_years: u32,
        residing_years: u32,
        is_one_house: bool,
    ) -> Decimal {
        if holding_years < MIN_HOLDING_YEARS {
            return Decimal::ZERO;
        }
        let rate = if is_one_house && residing_years >= MIN_RESIDING_YEARS {
            ONE_HOUSE_RATE_PER_YEAR * Decimal::from(holding_years)
                + ONE_HOUSE_RATE_PER_YEAR * Decimal::from(residing_years)
        } else {
            GENERAL_RATE_PER_YEAR * Decimal::from(holding_years)
        };
        rate.min(self.config.max_long_term_deduction)
    }

    fn tax_base(
        &self,
        taxable_gain: Manwon,
        deduction_rate: Decimal,
    ) -> Manwon {
        (taxable_gain * (Decimal::ONE - deduction_rate) - self.config.basic_deduction).floor_zero()
    }

    /// Looks up the bracket holding `tax_base` and applies its rate.
    fn progressive_tax(
        &self,
        tax_base: Manwon,
    ) -> Manwon {
        if tax_base <= Manwon::ZERO {
            return Manwon::ZERO;
        }
        let brackets = &self.config.brackets;
        let Some(bracket) = brackets
            .iter()
            .find(|b| b.contains(tax_base))
            .or(brackets.last())
        else {
            return Manwon::ZERO;
        };
        (tax_base * bracket.rate - bracket.progressive_deduction).floor_zero()
    }

    fn with_local_tax(
        &self,
        national_tax: Manwon,
    ) -> Manwon {
        national_tax * self.config.local_tax_multiplier
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::SimulationConfig;

    fn config() -> CapitalGainsConfig {
        SimulationConfig::korea_2025().capital_gains
    }

    fn manwon(value: Decimal) -> Manwon {
        Manwon::new(value)
    }

    fn input(
        sale: Decimal,
        acquisition: Decimal,
        holding_years: u32,
        residing_years: u32,
        is_one_house: bool,
    ) -> CapitalGainsInput {
        CapitalGainsInput {
            sale_price: manwon(sale),
            acquisition_price: manwon(acquisition),
            holding_years,
            residing_years,
            is_one_house,
            in_regulated_area: false,
        }
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_returns_zero_for_loss() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        let result = calculator.calculate(&input(dec!(40000), dec!(45000), 5, 0, false));

        assert_eq!(result.raw_gain, manwon(dec!(-5000)));
        assert_eq!(result.total_tax, Manwon::ZERO);
    }

    #[test]
    fn calculate_returns_zero_for_break_even() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        let result = calculator.calculate(&input(dec!(40000), dec!(40000), 5, 0, false));

        assert_eq!(result.total_tax, Manwon::ZERO);
    }

    #[test]
    fn calculate_exempts_one_house_at_or_below_ceiling() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        for sale in [dec!(60000), dec!(120000)] {
            let result = calculator.calculate(&input(sale, dec!(40000), 1, 0, true));

            assert_eq!(result.taxable_gain, Manwon::ZERO);
            assert_eq!(result.total_tax, Manwon::ZERO);
        }
    }

    #[test]
    fn calculate_high_value_one_house() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        // Sold at 15 eok, bought at 9 eok, held 10 years and resided 10 years.
        let result = calculator.calculate(&input(dec!(150000), dec!(90000), 10, 10, true));

        // Taxable = 60000 × (30000 / 150000) = 12000
        assert_eq!(result.taxable_gain, manwon(dec!(12000)));
        // 40% + 40% = 80%, exactly at the cap
        assert_eq!(result.long_term_deduction_rate, dec!(0.80));
        // 12000 × 0.2 − 250 = 2150
        assert_eq!(result.tax_base, manwon(dec!(2150)));
        // 2150 × 15% − 108 = 214.5
        assert_eq!(result.national_tax, manwon(dec!(214.5)));
        assert_eq!(result.total_tax, manwon(dec!(235.95)));
    }

    #[test]
    fn calculate_general_seller_in_top_bracket() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        let result = calculator.calculate(&input(dec!(300000), dec!(100000), 2, 0, false));

        // Base = 200000 − 250 = 199750; × 45% − 6540 = 83347.5
        assert_eq!(result.tax_base, manwon(dec!(199750)));
        assert_eq!(result.national_tax, manwon(dec!(83347.5)));
        assert_eq!(result.total_tax, manwon(dec!(91682.25)));
    }

    #[test]
    fn calculate_returns_zero_when_gain_within_basic_deduction() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        let result = calculator.calculate(&input(dec!(30200), dec!(30000), 1, 0, false));

        assert_eq!(result.tax_base, Manwon::ZERO);
        assert_eq!(result.total_tax, Manwon::ZERO);
    }

    // =========================================================================
    // taxable_gain tests
    // =========================================================================

    #[test]
    fn taxable_gain_is_full_gain_without_exemption() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        let result = calculator.taxable_gain(manwon(dec!(20000)), manwon(dec!(60000)), false);

        assert_eq!(result, manwon(dec!(20000)));
    }

    #[test]
    fn taxable_gain_is_prorated_above_ceiling() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        let result = calculator.taxable_gain(manwon(dec!(50000)), manwon(dec!(200000)), true);

        // 50000 × (80000 / 200000)
        assert_eq!(result, manwon(dec!(20000)));
    }

    // =========================================================================
    // long_term_deduction_rate tests
    // =========================================================================

    #[test]
    fn deduction_is_zero_below_three_years() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        assert_eq!(calculator.long_term_deduction_rate(2, 2, true), Decimal::ZERO);
        assert_eq!(calculator.long_term_deduction_rate(2, 0, false), Decimal::ZERO);
    }

    #[test]
    fn deduction_for_resident_one_house() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        assert_eq!(calculator.long_term_deduction_rate(3, 2, true), dec!(0.20));
    }

    #[test]
    fn deduction_falls_back_to_general_rate_without_residence() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        assert_eq!(calculator.long_term_deduction_rate(5, 1, true), dec!(0.10));
    }

    #[test]
    fn deduction_general_rate() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        assert_eq!(calculator.long_term_deduction_rate(15, 15, false), dec!(0.30));
    }

    #[test]
    fn deduction_is_capped_at_maximum() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        assert_eq!(calculator.long_term_deduction_rate(30, 30, true), dec!(0.80));
        assert_eq!(calculator.long_term_deduction_rate(60, 0, false), dec!(0.80));
    }

    // =========================================================================
    // progressive_tax tests
    // =========================================================================

    #[test]
    fn progressive_tax_first_bracket() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        assert_eq!(
            calculator.progressive_tax(manwon(dec!(1000))),
            manwon(dec!(60))
        );
    }

    #[test]
    fn progressive_tax_bracket_upper_bound_is_inclusive() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        // 4600 × 15% − 108
        assert_eq!(
            calculator.progressive_tax(manwon(dec!(4600))),
            manwon(dec!(582))
        );
    }

    #[test]
    fn progressive_tax_is_continuous_at_boundaries() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        // 8800 × 24% − 522 == 8800 × 35% − 1490
        assert_eq!(
            calculator.progressive_tax(manwon(dec!(8800))),
            manwon(dec!(1590))
        );
    }

    #[test]
    fn progressive_tax_zero_base() {
        let config = config();
        let calculator = CapitalGainsCalculator::new(&config);

        assert_eq!(calculator.progressive_tax(Manwon::ZERO), Manwon::ZERO);
    }
}
