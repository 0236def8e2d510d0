//! Human-readable summary of the regulatory rules a configuration encodes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::SimulationConfig;

/// Percentage points above the DSR cap still shown as a caution rather than a breach.
const DSR_CAUTION_MARGIN: Decimal = dec!(10);

/// One line of the criteria summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub label: String,
    pub value: String,
    pub note: String,
}

impl Criterion {
    fn new(
        label: &str,
        value: String,
        note: &str,
    ) -> Self {
        Self {
            label: label.to_string(),
            value,
            note: note.to_string(),
        }
    }
}

/// Lists the DSR, LTV, exemption and acquisition-tax rules of `config`.
///
/// # Example
///
/// ```
/// use bridge_core::{SimulationConfig, criteria_summary};
///
/// let criteria = criteria_summary(&SimulationConfig::korea_2025());
///
/// assert_eq!(criteria[0].label, "DSR limit");
/// assert_eq!(criteria[0].value, "40% (stress +1.5%p)");
/// ```
pub fn criteria_summary(config: &SimulationConfig) -> Vec<Criterion> {
    let cg = &config.capital_gains;
    let acq = &config.acquisition;

    vec![
        Criterion::new(
            "DSR limit",
            format!(
                "{}% (stress +{}%p)",
                as_percent(config.loan.dsr_limit),
                config.loan.stress_rate_add_on.normalize()
            ),
            "Loan limit uses the nominal rate plus the stress add-on",
        ),
        Criterion::new(
            "LTV",
            format!("user input (max {}%)", config.loan.ltv_max.normalize()),
            "Regulated-area LTV caps are not reflected",
        ),
        Criterion::new(
            "One-house exemption",
            format!("up to {} eok", cg.exemption_ceiling.as_eok().normalize()),
            &format!(
                "Long-term holding deduction up to {}%",
                as_percent(cg.max_long_term_deduction)
            ),
        ),
        Criterion::new(
            "Acquisition tax",
            format!(
                "{}% to {}% (+{}% education surtax)",
                as_percent(acq.low_rate),
                as_percent(acq.high_rate),
                as_percent(acq.education_surtax)
            ),
            "Heavy rates for multiple homes are not reflected",
        ),
    ]
}

fn as_percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).normalize()
}

/// Where a realized DSR sits relative to the regulatory cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DsrBand {
    /// At or below the cap.
    Safe,
    /// Up to ten points above the cap.
    Caution,
    /// Further above the cap, or no income to measure against.
    Danger,
}

impl DsrBand {
    /// Classifies a DSR in percent against `config.loan.dsr_limit`.
    pub fn classify(
        dsr_ratio: Option<Decimal>,
        config: &SimulationConfig,
    ) -> Self {
        let Some(ratio) = dsr_ratio else {
            return Self::Danger;
        };
        let cap = as_percent(config.loan.dsr_limit);
        if ratio <= cap {
            Self::Safe
        } else if ratio <= cap + DSR_CAUTION_MARGIN {
            Self::Caution
        } else {
            Self::Danger
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Danger => "at risk",
        }
    }
}
