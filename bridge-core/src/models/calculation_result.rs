use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Manwon;
use crate::calculations::{AcquisitionTax, CapitalGainsBreakdown, LoanLimits};

/// Cash movements from the starting capital to the purchase, in chart order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waterfall {
    pub start_capital: Manwon,
    pub sale_price: Manwon,
    pub payoff_old_loan: Manwon,
    /// Capital-gains tax, both brokerage fees, acquisition tax and moving cost.
    pub taxes_and_fees: Manwon,
    pub purchase_price: Manwon,
}

/// Every figure derived from one [`SimulatorInputs`](crate::SimulatorInputs).
///
/// Rebuilt in full by each call to
/// [`Engine::compute`](crate::Engine::compute); nothing in it depends on an
/// earlier call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    // Selling side
    pub capital_gains_tax: Manwon,
    pub old_house_agent_fee: Manwon,
    /// Sale price minus mortgage payoff, capital-gains tax and selling fee.
    pub net_sale_proceeds: Manwon,

    // Buying side
    pub acquisition_tax: Manwon,
    pub new_house_agent_fee: Manwon,
    pub moving_cost: Manwon,
    /// Acquisition tax, buying fee and moving cost.
    pub total_closing_costs: Manwon,

    // Loan analysis
    pub max_loan_dsr: Manwon,
    pub max_loan_ltv: Manwon,
    /// The smaller of the two limits.
    pub max_loan_possible: Manwon,
    /// Loan actually needed to close; never negative.
    pub final_loan_amount: Manwon,
    /// Monthly payment on `final_loan_amount` at the nominal rate.
    pub monthly_payment: Manwon,
    /// Realized DSR in percent. `None` when annual income is zero.
    pub dsr_ratio: Option<Decimal>,

    // Feasibility
    pub funds_available: Manwon,
    pub funds_needed: Manwon,
    /// Surplus (positive) or deficit (negative) even at maximum borrowing.
    pub cash_balance: Manwon,
    /// Monthly income left after the mortgage payment and living costs.
    pub monthly_net_income: Manwon,
    pub is_dsr_safe: bool,
    pub is_cash_flow_safe: bool,

    pub waterfall: Waterfall,
    pub details: ResultDetails,
}

/// Intermediate figures kept for explanation screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDetails {
    pub capital_gains: CapitalGainsBreakdown,
    pub acquisition: AcquisitionTax,
    pub loan_limits: LoanLimits,
}

impl CalculationResult {
    /// True when maximum borrowing covers the purchase.
    pub fn is_feasible(&self) -> bool {
        !self.cash_balance.is_negative()
    }

    pub fn deficit(&self) -> Manwon {
        (-self.cash_balance).floor_zero()
    }
}
