//! Acquisition tax (chwideuk-se) on the property being bought.
//!
//! The rate comes from one of two paths:
//!
//! * [`AcquisitionTaxPath::Additive`] (price at or below the high threshold):
//!   the base rate is 1% up to the low threshold and
//!   `(price_in_eok × 2/3 − 3) / 100` between the thresholds; the education
//!   surtax is added, plus the rural surtax for units over 85 m². The combined
//!   rate is rounded half-up to four decimal places.
//! * [`AcquisitionTaxPath::FlatOverride`] (price above the high threshold):
//!   the combined rate is one of two flat values (3.3%, or 3.5% over 85 m²)
//!   rather than the 3% base plus surtaxes.
//!
//! The paths disagree at the high threshold: an oversized unit at exactly
//! 9 eok pays 3.3% while one just above pays 3.5%, and a standard unit moves
//! from 3.1% to 3.3%. This is a known discontinuity in the published
//! simplification and is preserved.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Manwon;
use crate::calculations::common::{percent_to_fraction, round_half_up};
use crate::models::AcquisitionConfig;

const COMBINED_RATE_DP: u32 = 4;

/// Which branch of the rate schedule produced the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionTaxPath {
    /// Base rate plus education (and rural) surtax.
    Additive,
    /// Flat top-bracket combined rate.
    FlatOverride,
}

/// Result of the acquisition-tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionTax {
    pub path: AcquisitionTaxPath,
    /// Base rate before surtaxes (the 3% high rate on the override path).
    pub base_rate: Decimal,
    /// Rate actually applied to the price.
    pub combined_rate: Decimal,
    pub amount: Manwon,
}

/// Calculator for the acquisition tax.
///
/// # Example
///
/// ```
/// use bridge_core::calculations::{AcquisitionTaxCalculator, AcquisitionTaxPath};
/// use bridge_core::{Manwon, SimulationConfig};
/// use rust_decimal_macros::dec;
///
/// let config = SimulationConfig::korea_2025();
/// let calculator = AcquisitionTaxCalculator::new(&config.acquisition);
///
/// let tax = calculator.calculate(Manwon::new(dec!(90000)), false);
///
/// assert_eq!(tax.path, AcquisitionTaxPath::Additive);
/// assert_eq!(tax.combined_rate, dec!(0.031));
/// assert_eq!(tax.amount, Manwon::new(dec!(2790)));
/// ```
#[derive(Debug, Clone)]
pub struct AcquisitionTaxCalculator<'a> {
    config: &'a AcquisitionConfig,
}

impl<'a> AcquisitionTaxCalculator<'a> {
    pub fn new(config: &'a AcquisitionConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        price: Manwon,
        size_over_85: bool,
    ) -> AcquisitionTax {
        let (path, base_rate, combined_rate) = if price > self.config.high_threshold {
            (
                AcquisitionTaxPath::FlatOverride,
                self.config.high_rate,
                self.flat_override_rate(size_over_85),
            )
        } else {
            let base_rate = self.base_rate(price);
            (
                AcquisitionTaxPath::Additive,
                base_rate,
                self.additive_rate(base_rate, size_over_85),
            )
        };

        AcquisitionTax {
            path,
            base_rate,
            combined_rate,
            amount: price * combined_rate,
        }
    }

    /// Base rate for prices at or below the high threshold.
    fn base_rate(
        &self,
        price: Manwon,
    ) -> Decimal {
        if price <= self.config.low_threshold {
            return self.config.low_rate;
        }
        let price_eok = price.as_eok();
        percent_to_fraction(price_eok * Decimal::TWO / Decimal::from(3) - Decimal::from(3))
    }

    fn additive_rate(
        &self,
        base_rate: Decimal,
        size_over_85: bool,
    ) -> Decimal {
        let mut rate = base_rate + self.config.education_surtax;
        if size_over_85 {
            rate += self.config.rural_surtax;
        }
        round_half_up(rate, COMBINED_RATE_DP)
    }

    fn flat_override_rate(
        &self,
        size_over_85: bool,
    ) -> Decimal {
        if size_over_85 {
            self.config.top_flat_rate_oversized
        } else {
            self.config.top_flat_rate
        }
    }
}
