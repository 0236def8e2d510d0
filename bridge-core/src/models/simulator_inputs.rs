use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Manwon;

/// Problems a caller can detect before handing inputs to the engine.
///
/// The engine itself never validates; see [`SimulatorInputs::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Manwon },

    #[error("target LTV must be between 0 and 100 percent, got {0}")]
    LtvOutOfRange(Decimal),

    #[error("mortgage rate must be non-negative, got {0}")]
    NegativeRate(Decimal),
}

/// Everything the household describes about itself and the two properties.
///
/// All amounts are in man-won. Missing fields in a scenario file fall back to
/// the [`Default`] household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorInputs {
    // Household
    pub annual_income: Manwon,
    pub cash_assets: Manwon,
    pub monthly_living_cost: Manwon,
    /// Yearly principal and interest paid on loans other than the mortgage.
    pub other_annual_debt_payment: Manwon,

    // Property being sold
    /// Expected sale price.
    pub current_house_price: Manwon,
    /// Original purchase price.
    pub current_house_acq_price: Manwon,
    /// Mortgage balance repaid out of the sale.
    pub existing_loan_balance: Manwon,
    pub holding_years: u32,
    pub residing_years: u32,
    /// Eligible for the one-household capital-gains exemption.
    pub is_one_house: bool,
    /// Located in a regulated (adjusted) area. Carried for reporting only.
    pub in_regulated_area: bool,

    // Property being bought
    pub target_house_price: Manwon,
    /// Exclusive floor area above 85 m².
    pub target_size_over_85: bool,
    /// Nominal annual mortgage rate in percent.
    pub mortgage_rate: Decimal,
    pub loan_term_years: u32,
    /// Requested loan-to-value in percent.
    pub target_ltv: Decimal,
}

impl Default for SimulatorInputs {
    /// A young dual-income couple moving from a 6 eok to a 9 eok apartment.
    fn default() -> Self {
        Self {
            annual_income: Manwon::new(dec!(8000)),
            cash_assets: Manwon::new(dec!(5000)),
            monthly_living_cost: Manwon::new(dec!(250)),
            other_annual_debt_payment: Manwon::ZERO,

            current_house_price: Manwon::new(dec!(60000)),
            current_house_acq_price: Manwon::new(dec!(40000)),
            existing_loan_balance: Manwon::new(dec!(20000)),
            holding_years: 3,
            residing_years: 2,
            is_one_house: true,
            in_regulated_area: false,

            target_house_price: Manwon::new(dec!(90000)),
            target_size_over_85: false,
            mortgage_rate: dec!(4.5),
            loan_term_years: 40,
            target_ltv: dec!(70),
        }
    }
}

impl SimulatorInputs {
    /// Number of monthly payments over the loan term.
    pub fn loan_periods(&self) -> u32 {
        self.loan_term_years.saturating_mul(12)
    }

    /// Checks the ranges the engine assumes but does not enforce.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError`] found.
    ///
    /// # Example
    ///
    /// ```
    /// use bridge_core::{InputError, SimulatorInputs};
    /// use rust_decimal_macros::dec;
    ///
    /// let inputs = SimulatorInputs {
    ///     target_ltv: dec!(120),
    ///     ..SimulatorInputs::default()
    /// };
    ///
    /// assert_eq!(inputs.validate(), Err(InputError::LtvOutOfRange(dec!(120))));
    /// ```
    pub fn validate(&self) -> Result<(), InputError> {
        let amounts = [
            ("annual_income", self.annual_income),
            ("cash_assets", self.cash_assets),
            ("monthly_living_cost", self.monthly_living_cost),
            ("other_annual_debt_payment", self.other_annual_debt_payment),
            ("current_house_price", self.current_house_price),
            ("current_house_acq_price", self.current_house_acq_price),
            ("existing_loan_balance", self.existing_loan_balance),
            ("target_house_price", self.target_house_price),
        ];
        if let Some((field, value)) = amounts.into_iter().find(|(_, v)| v.is_negative()) {
            return Err(InputError::NegativeAmount { field, value });
        }
        if self.target_ltv < Decimal::ZERO || self.target_ltv > Decimal::ONE_HUNDRED {
            return Err(InputError::LtvOutOfRange(self.target_ltv));
        }
        if self.mortgage_rate < Decimal::ZERO {
            return Err(InputError::NegativeRate(self.mortgage_rate));
        }
        Ok(())
    }
}
