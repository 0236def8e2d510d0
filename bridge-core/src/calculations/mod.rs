//! Calculation modules for the sell-and-buy affordability pipeline.
//!
//! Each tax or fee has its own calculator borrowing the relevant section of
//! [`SimulationConfig`](crate::SimulationConfig); [`engine`] chains them.

pub mod acquisition;
pub mod amortization;
pub mod brokerage;
pub mod capital_gains;
pub mod common;
pub mod comparison;
pub mod engine;

pub use acquisition::{AcquisitionTax, AcquisitionTaxCalculator, AcquisitionTaxPath};
pub use brokerage::BrokerageFeeSchedule;
pub use capital_gains::{CapitalGainsBreakdown, CapitalGainsCalculator, CapitalGainsInput};
pub use comparison::{ScenarioComparison, ScenarioOutcome};
pub use engine::{Engine, LoanLimits, calculate_scenario, loan_limits};
