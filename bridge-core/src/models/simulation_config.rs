//! Regulatory constants consulted by the calculators.
//!
//! A [`SimulationConfig`] is one self-contained regulatory year: tax tables,
//! fee tiers and lending limits. It is built once (from
//! [`SimulationConfig::korea_2025`] or a configuration file) and then only
//! read, so several years can live side by side in a
//! [`ConfigRegistry`](crate::ConfigRegistry).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Manwon;
use crate::models::{BrokerageTier, TaxBracket};

/// Errors raised when a configuration is internally inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The capital-gains rate schedule has no rows.
    #[error("capital gains bracket table is empty")]
    EmptyBrackets,

    /// Bracket upper bounds must increase strictly, and only the last may be open.
    #[error("capital gains bracket {index} is out of order")]
    UnorderedBrackets { index: usize },

    /// The top bracket must be unbounded so every tax base has a rate.
    #[error("last capital gains bracket must be unbounded")]
    UnboundedBracketMissing,

    /// The brokerage schedule has no tiers.
    #[error("brokerage tier table is empty")]
    EmptyBrokerageTiers,

    /// Tier upper bounds must increase strictly.
    #[error("brokerage tier {index} is out of order")]
    UnorderedBrokerageTiers { index: usize },

    /// The final tier must be unbounded so every price has a rate.
    #[error("last brokerage tier must be unbounded")]
    UnboundedTierMissing,

    /// A rate or ratio was outside `[0, 1]`.
    #[error("{field} must be between 0 and 1, got {value}")]
    RatioOutOfRange { field: &'static str, value: Decimal },

    /// A monetary constant or percentage-point add-on was negative.
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    /// The local surtax multiplier cannot reduce the national tax.
    #[error("local tax multiplier must be at least 1, got {0}")]
    InvalidLocalTaxMultiplier(Decimal),

    /// The acquisition-tax interpolation band is inverted.
    #[error("acquisition low threshold {low} exceeds high threshold {high}")]
    InvertedAcquisitionThresholds { low: Manwon, high: Manwon },

    /// No configuration is registered for the requested year.
    #[error("no configuration for regulatory year {year}; available: {available:?}")]
    UnknownRegulatoryYear { year: i32, available: Vec<i32> },
}

/// Capital-gains (yangdo-se) constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsConfig {
    /// Sale price up to which a one-household seller pays nothing.
    pub exemption_ceiling: Manwon,
    /// Fixed annual basic deduction subtracted from the tax base.
    pub basic_deduction: Manwon,
    /// Cap on the long-term holding deduction rate.
    pub max_long_term_deduction: Decimal,
    /// Multiplier adding the local income tax on top of the national tax.
    pub local_tax_multiplier: Decimal,
    /// Progressive schedule, ordered by upper bound.
    pub brackets: Vec<TaxBracket>,
}

/// Acquisition-tax (chwideuk-se) constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// At or below this price the flat low rate applies.
    pub low_threshold: Manwon,
    /// Above this price the flat override path applies.
    pub high_threshold: Manwon,
    pub low_rate: Decimal,
    pub high_rate: Decimal,
    /// Local education surtax.
    pub education_surtax: Decimal,
    /// Rural special surtax, charged only on units over 85 m².
    pub rural_surtax: Decimal,
    /// Combined rate above the high threshold for units up to 85 m².
    pub top_flat_rate: Decimal,
    /// Combined rate above the high threshold for units over 85 m².
    pub top_flat_rate_oversized: Decimal,
}

/// Lending constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanConfig {
    /// Share of annual income that total debt service may consume.
    pub dsr_limit: Decimal,
    /// Percentage points added to the nominal rate for DSR limits.
    pub stress_rate_add_on: Decimal,
    /// Regulatory LTV ceiling in percent. Informational: the user's own LTV is applied.
    pub ltv_max: Decimal,
}

/// Transaction costs other than taxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Ordered brokerage schedule; the last tier is unbounded.
    pub brokerage_tiers: Vec<BrokerageTier>,
    /// Flat moving-cost estimate.
    pub moving_cost: Manwon,
}

/// A complete regulatory year.
///
/// # Example
///
/// ```
/// use bridge_core::SimulationConfig;
/// use rust_decimal_macros::dec;
///
/// let config = SimulationConfig::korea_2025();
///
/// assert_eq!(config.regulatory_year, 2025);
/// assert_eq!(config.loan.dsr_limit, dec!(0.40));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub regulatory_year: i32,
    /// First day these constants apply.
    pub effective_from: NaiveDate,
    pub capital_gains: CapitalGainsConfig,
    pub acquisition: AcquisitionConfig,
    pub loan: LoanConfig,
    pub fees: FeeConfig,
}

impl SimulationConfig {
    /// The 2024/2025 constants (simplified general-rate schedule).
    pub fn korea_2025() -> Self {
        Self {
            regulatory_year: 2025,
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            capital_gains: CapitalGainsConfig {
                exemption_ceiling: Manwon::from_eok(dec!(12)),
                basic_deduction: Manwon::new(dec!(250)),
                max_long_term_deduction: dec!(0.80),
                local_tax_multiplier: dec!(1.10),
                brackets: vec![
                    bracket(Some(dec!(1200)), dec!(0.06), dec!(0)),
                    bracket(Some(dec!(4600)), dec!(0.15), dec!(108)),
                    bracket(Some(dec!(8800)), dec!(0.24), dec!(522)),
                    bracket(Some(dec!(15000)), dec!(0.35), dec!(1490)),
                    bracket(Some(dec!(30000)), dec!(0.38), dec!(1940)),
                    bracket(Some(dec!(50000)), dec!(0.40), dec!(2540)),
                    bracket(Some(dec!(100000)), dec!(0.42), dec!(3540)),
                    bracket(None, dec!(0.45), dec!(6540)),
                ],
            },
            acquisition: AcquisitionConfig {
                low_threshold: Manwon::from_eok(dec!(6)),
                high_threshold: Manwon::from_eok(dec!(9)),
                low_rate: dec!(0.01),
                high_rate: dec!(0.03),
                education_surtax: dec!(0.001),
                rural_surtax: dec!(0.002),
                top_flat_rate: dec!(0.033),
                top_flat_rate_oversized: dec!(0.035),
            },
            loan: LoanConfig {
                dsr_limit: dec!(0.40),
                stress_rate_add_on: dec!(1.5),
                ltv_max: dec!(80),
            },
            fees: FeeConfig {
                brokerage_tiers: vec![
                    tier(Some(dec!(5000)), dec!(0.006)),
                    tier(Some(dec!(20000)), dec!(0.005)),
                    tier(Some(dec!(90000)), dec!(0.004)),
                    tier(Some(dec!(120000)), dec!(0.005)),
                    tier(Some(dec!(150000)), dec!(0.006)),
                    tier(None, dec!(0.007)),
                ],
                moving_cost: Manwon::new(dec!(200)),
            },
        }
    }

    /// Validates every table and constant.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    ///
    /// # Example
    ///
    /// ```
    /// use bridge_core::{ConfigError, SimulationConfig};
    /// use rust_decimal_macros::dec;
    ///
    /// let mut config = SimulationConfig::korea_2025();
    /// config.loan.dsr_limit = dec!(1.4);
    ///
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigError::RatioOutOfRange { field: "loan.dsr_limit", value: dec!(1.4) })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_capital_gains()?;
        self.validate_acquisition()?;
        self.validate_loan()?;
        self.validate_fees()
    }

    fn validate_capital_gains(&self) -> Result<(), ConfigError> {
        let cg = &self.capital_gains;
        non_negative("capital_gains.exemption_ceiling", cg.exemption_ceiling.value())?;
        non_negative("capital_gains.basic_deduction", cg.basic_deduction.value())?;
        ratio(
            "capital_gains.max_long_term_deduction",
            cg.max_long_term_deduction,
        )?;
        if cg.local_tax_multiplier < Decimal::ONE {
            return Err(ConfigError::InvalidLocalTaxMultiplier(
                cg.local_tax_multiplier,
            ));
        }

        let Some(last) = cg.brackets.last() else {
            return Err(ConfigError::EmptyBrackets);
        };
        if last.upper_bound.is_some() {
            return Err(ConfigError::UnboundedBracketMissing);
        }
        for (index, b) in cg.brackets.iter().enumerate() {
            ratio("capital_gains.brackets.rate", b.rate)?;
            non_negative(
                "capital_gains.brackets.progressive_deduction",
                b.progressive_deduction.value(),
            )?;
            if index == 0 {
                continue;
            }
            let previous = &cg.brackets[index - 1];
            let ordered = match (previous.upper_bound, b.upper_bound) {
                (Some(prev), Some(cur)) => cur > prev,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !ordered || b.rate <= previous.rate {
                return Err(ConfigError::UnorderedBrackets { index });
            }
        }
        Ok(())
    }

    fn validate_acquisition(&self) -> Result<(), ConfigError> {
        let acq = &self.acquisition;
        non_negative("acquisition.low_threshold", acq.low_threshold.value())?;
        if acq.low_threshold > acq.high_threshold {
            return Err(ConfigError::InvertedAcquisitionThresholds {
                low: acq.low_threshold,
                high: acq.high_threshold,
            });
        }
        ratio("acquisition.low_rate", acq.low_rate)?;
        ratio("acquisition.high_rate", acq.high_rate)?;
        ratio("acquisition.education_surtax", acq.education_surtax)?;
        ratio("acquisition.rural_surtax", acq.rural_surtax)?;
        ratio("acquisition.top_flat_rate", acq.top_flat_rate)?;
        ratio(
            "acquisition.top_flat_rate_oversized",
            acq.top_flat_rate_oversized,
        )
    }

    fn validate_loan(&self) -> Result<(), ConfigError> {
        ratio("loan.dsr_limit", self.loan.dsr_limit)?;
        non_negative("loan.stress_rate_add_on", self.loan.stress_rate_add_on)?;
        ratio("loan.ltv_max", self.loan.ltv_max / Decimal::ONE_HUNDRED)
            .map_err(|_| ConfigError::RatioOutOfRange {
                field: "loan.ltv_max",
                value: self.loan.ltv_max,
            })
    }

    fn validate_fees(&self) -> Result<(), ConfigError> {
        let fees = &self.fees;
        non_negative("fees.moving_cost", fees.moving_cost.value())?;

        let Some(last) = fees.brokerage_tiers.last() else {
            return Err(ConfigError::EmptyBrokerageTiers);
        };
        if last.upper_bound.is_some() {
            return Err(ConfigError::UnboundedTierMissing);
        }
        for (index, t) in fees.brokerage_tiers.iter().enumerate() {
            ratio("fees.brokerage_tiers.rate", t.rate)?;
            if index == 0 {
                continue;
            }
            let previous = &fees.brokerage_tiers[index - 1];
            let bound_ordered = match (previous.upper_bound, t.upper_bound) {
                (Some(prev), Some(cur)) => cur > prev,
                (Some(_), None) => true,
                (None, _) => false,
            };
            // Tier rates are not monotonic (0.6% down to 0.4%, then up to 0.7%).
            if !bound_ordered {
                return Err(ConfigError::UnorderedBrokerageTiers { index });
            }
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::korea_2025()
    }
}

fn bracket(
    upper_bound: Option<Decimal>,
    rate: Decimal,
    progressive_deduction: Decimal,
) -> TaxBracket {
    TaxBracket {
        upper_bound: upper_bound.map(Manwon::new),
        rate,
        progressive_deduction: Manwon::new(progressive_deduction),
    }
}

fn tier(
    upper_bound: Option<Decimal>,
    rate: Decimal,
) -> BrokerageTier {
    BrokerageTier {
        upper_bound: upper_bound.map(Manwon::new),
        rate,
    }
}

fn ratio(
    field: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ConfigError::RatioOutOfRange { field, value });
    }
    Ok(())
}

fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}
