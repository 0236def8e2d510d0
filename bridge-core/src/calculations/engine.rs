//! The affordability pipeline.
//!
//! | Stage | Description |
//! |-------|-------------|
//! | 1     | Capital-gains tax on the sold property |
//! | 2     | Acquisition tax on the bought property |
//! | 3     | Brokerage fees on both properties, plus moving cost |
//! | 4     | Loan limits: LTV, and DSR via the stressed-rate inverse annuity |
//! | 5     | Funds available, funds needed, required loan and cash balance |
//!
//! Each stage only reads the inputs and the results of earlier stages.
//!
//! # Example
//!
//! ```
//! use bridge_core::{Engine, SimulatorInputs};
//! use rust_decimal_macros::dec;
//!
//! let engine = Engine::default();
//! let result = engine.compute(&SimulatorInputs::default());
//!
//! assert_eq!(result.acquisition_tax.value(), dec!(2790));
//! assert_eq!(result.final_loan_amount.value(), dec!(48680));
//! assert!(!result.is_feasible());
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Manwon;
use crate::calculations::amortization::{max_principal, monthly_payment};
use crate::calculations::common::percent_to_fraction;
use crate::calculations::{
    AcquisitionTaxCalculator, BrokerageFeeSchedule, CapitalGainsCalculator, CapitalGainsInput,
};
use crate::models::{
    CalculationResult, ConfigError, ResultDetails, SimulationConfig, SimulatorInputs, Waterfall,
};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Maximum borrowing allowed by each constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanLimits {
    /// Target price × target LTV.
    pub ltv_limit: Manwon,
    /// Principal the stressed DSR ceiling can service.
    pub dsr_limit: Manwon,
    /// The smaller of the two.
    pub max_loan: Manwon,
    /// Income × DSR cap − other annual debt service; may be negative.
    pub annual_dsr_ceiling: Manwon,
    /// Nominal rate plus the stress add-on, in percent.
    pub stress_rate: Decimal,
}

/// Computes affordability results against one regulatory configuration.
///
/// The engine owns its configuration and holds no other state, so it can be
/// shared freely between threads. The default engine applies
/// [`SimulationConfig::korea_2025`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engine {
    config: SimulationConfig,
}

impl Engine {
    /// Creates an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is inconsistent.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs the full pipeline. Infallible: every degenerate case is guarded numerically.
    pub fn compute(
        &self,
        inputs: &SimulatorInputs,
    ) -> CalculationResult {
        calculate_scenario(&self.config, inputs)
    }
}

/// Runs the pipeline against `config`, which is assumed to be valid.
pub fn calculate_scenario(
    config: &SimulationConfig,
    inputs: &SimulatorInputs,
) -> CalculationResult {
    // Stage 1: capital gains
    let capital_gains = CapitalGainsCalculator::new(&config.capital_gains)
        .calculate(&CapitalGainsInput::from(inputs));
    let capital_gains_tax = capital_gains.total_tax;
    debug!(
        raw_gain = %capital_gains.raw_gain,
        deduction_rate = %capital_gains.long_term_deduction_rate,
        tax = %capital_gains_tax,
        "capital gains tax"
    );

    // Stage 2: acquisition
    let acquisition = AcquisitionTaxCalculator::new(&config.acquisition)
        .calculate(inputs.target_house_price, inputs.target_size_over_85);
    let acquisition_tax = acquisition.amount;
    debug!(
        path = ?acquisition.path,
        rate = %acquisition.combined_rate,
        tax = %acquisition_tax,
        "acquisition tax"
    );

    // Stage 3: fees
    let brokerage = BrokerageFeeSchedule::new(&config.fees.brokerage_tiers);
    let old_house_agent_fee = brokerage.fee(inputs.current_house_price);
    let new_house_agent_fee = brokerage.fee(inputs.target_house_price);
    let moving_cost = config.fees.moving_cost;
    let total_closing_costs = acquisition_tax + new_house_agent_fee + moving_cost;

    // Stage 4: loan limits
    let loan_limits = loan_limits(config, inputs);

    // Stage 5: feasibility
    let net_sale_proceeds = inputs.current_house_price
        - inputs.existing_loan_balance
        - capital_gains_tax
        - old_house_agent_fee;
    let funds_available = inputs.cash_assets + net_sale_proceeds;
    let funds_needed = inputs.target_house_price + total_closing_costs;
    let final_loan_amount = (funds_needed - funds_available).floor_zero();
    let cash_balance = funds_available + loan_limits.max_loan - funds_needed;

    let payment = monthly_payment(
        inputs.mortgage_rate,
        inputs.loan_periods(),
        final_loan_amount,
    );
    let annual_debt_service = payment * MONTHS_PER_YEAR + inputs.other_annual_debt_payment;
    let dsr_ratio = annual_debt_service
        .ratio_to(inputs.annual_income)
        .map(|ratio| ratio * Decimal::ONE_HUNDRED);
    let is_dsr_safe =
        dsr_ratio.is_some_and(|ratio| ratio <= config.loan.dsr_limit * Decimal::ONE_HUNDRED);

    let monthly_net_income =
        inputs.annual_income / MONTHS_PER_YEAR - payment - inputs.monthly_living_cost;
    let is_cash_flow_safe = monthly_net_income > Manwon::ZERO;

    debug!(
        %funds_available,
        %funds_needed,
        loan = %final_loan_amount,
        %cash_balance,
        "feasibility"
    );

    CalculationResult {
        capital_gains_tax,
        old_house_agent_fee,
        net_sale_proceeds,
        acquisition_tax,
        new_house_agent_fee,
        moving_cost,
        total_closing_costs,
        max_loan_dsr: loan_limits.dsr_limit,
        max_loan_ltv: loan_limits.ltv_limit,
        max_loan_possible: loan_limits.max_loan,
        final_loan_amount,
        monthly_payment: payment,
        dsr_ratio,
        funds_available,
        funds_needed,
        cash_balance,
        monthly_net_income,
        is_dsr_safe,
        is_cash_flow_safe,
        waterfall: Waterfall {
            start_capital: inputs.cash_assets,
            sale_price: inputs.current_house_price,
            payoff_old_loan: inputs.existing_loan_balance,
            taxes_and_fees: capital_gains_tax
                + old_house_agent_fee
                + acquisition_tax
                + new_house_agent_fee
                + moving_cost,
            purchase_price: inputs.target_house_price,
        },
        details: ResultDetails {
            capital_gains,
            acquisition,
            loan_limits,
        },
    }
}

/// LTV and DSR borrowing limits for the target purchase.
///
/// The DSR limit inverts the annuity at the *stressed* rate, while the
/// payment shown to the user later uses the nominal rate.
pub fn loan_limits(
    config: &SimulationConfig,
    inputs: &SimulatorInputs,
) -> LoanLimits {
    let ltv_limit = inputs.target_house_price * percent_to_fraction(inputs.target_ltv);

    let annual_dsr_ceiling =
        inputs.annual_income * config.loan.dsr_limit - inputs.other_annual_debt_payment;
    let stress_rate = inputs.mortgage_rate + config.loan.stress_rate_add_on;

    let dsr_limit = if annual_dsr_ceiling > Manwon::ZERO {
        max_principal(
            stress_rate,
            inputs.loan_periods(),
            annual_dsr_ceiling / MONTHS_PER_YEAR,
        )
    } else {
        if inputs.other_annual_debt_payment > Manwon::ZERO {
            warn!(%annual_dsr_ceiling, "existing debt exhausts DSR capacity");
        } else {
            debug!("no income, no DSR capacity");
        }
        Manwon::ZERO
    };

    LoanLimits {
        ltv_limit,
        dsr_limit,
        max_loan: ltv_limit.min(dsr_limit),
        annual_dsr_ceiling,
        stress_rate,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::AcquisitionTaxPath;

    fn assert_close(
        actual: Manwon,
        expected: Decimal,
    ) {
        let diff = (actual.value() - expected).abs();
        assert!(diff <= dec!(0.0000001), "expected {expected}, got {actual}");
    }

    fn manwon(value: Decimal) -> Manwon {
        Manwon::new(value)
    }

    // =========================================================================
    // default household
    // =========================================================================

    #[test]
    fn default_household_taxes_and_fees() {
        let result = Engine::default().compute(&SimulatorInputs::default());

        // 6 eok one-house sale is fully exempt.
        assert_eq!(result.capital_gains_tax, Manwon::ZERO);
        // 9 eok is not above the high threshold: additive path, 3% + 0.1%.
        assert_eq!(result.details.acquisition.path, AcquisitionTaxPath::Additive);
        assert_eq!(result.acquisition_tax, manwon(dec!(2790)));
        assert_eq!(result.old_house_agent_fee, manwon(dec!(240)));
        assert_eq!(result.new_house_agent_fee, manwon(dec!(450)));
        assert_eq!(result.moving_cost, manwon(dec!(200)));
        assert_eq!(result.total_closing_costs, manwon(dec!(3440)));
    }

    #[test]
    fn default_household_funds() {
        let result = Engine::default().compute(&SimulatorInputs::default());

        assert_eq!(result.net_sale_proceeds, manwon(dec!(39760)));
        assert_eq!(result.funds_available, manwon(dec!(44760)));
        assert_eq!(result.funds_needed, manwon(dec!(93440)));
        assert_eq!(result.final_loan_amount, manwon(dec!(48680)));
    }

    #[test]
    fn default_household_loan_limits() {
        let result = Engine::default().compute(&SimulatorInputs::default());

        assert_eq!(result.max_loan_ltv, manwon(dec!(63000)));
        assert_close(result.max_loan_dsr, dec!(48466.0224660928865965));
        assert_eq!(result.max_loan_possible, result.max_loan_dsr);
        assert_eq!(result.details.loan_limits.stress_rate, dec!(6.0));
        assert_eq!(
            result.details.loan_limits.annual_dsr_ceiling,
            manwon(dec!(3200))
        );
    }

    #[test]
    fn default_household_is_short_even_at_maximum_borrowing() {
        let result = Engine::default().compute(&SimulatorInputs::default());

        assert_close(result.cash_balance, dec!(-213.9775339071134035));
        assert!(!result.is_feasible());
        assert_close(result.deficit(), dec!(213.9775339071134035));
    }

    #[test]
    fn default_household_payment_and_safety() {
        let result = Engine::default().compute(&SimulatorInputs::default());

        assert_close(result.monthly_payment, dec!(218.8471892194919773));
        let dsr = result.dsr_ratio.expect("income is positive");
        assert!((dsr - dec!(32.8270783829237966)).abs() < dec!(0.000001));
        assert!(result.is_dsr_safe);
        assert_close(result.monthly_net_income, dec!(197.8194774471746893));
        assert!(result.is_cash_flow_safe);
    }

    #[test]
    fn default_household_waterfall() {
        let result = Engine::default().compute(&SimulatorInputs::default());

        assert_eq!(
            result.waterfall,
            Waterfall {
                start_capital: manwon(dec!(5000)),
                sale_price: manwon(dec!(60000)),
                payoff_old_loan: manwon(dec!(20000)),
                taxes_and_fees: manwon(dec!(3680)),
                purchase_price: manwon(dec!(90000)),
            }
        );
    }

    // =========================================================================
    // edge cases
    // =========================================================================

    #[test]
    fn cash_rich_household_needs_no_loan() {
        let inputs = SimulatorInputs {
            cash_assets: manwon(dec!(100000)),
            ..SimulatorInputs::default()
        };

        let result = Engine::default().compute(&inputs);

        assert_eq!(result.final_loan_amount, Manwon::ZERO);
        assert_eq!(result.monthly_payment, Manwon::ZERO);
        assert_eq!(result.dsr_ratio, Some(Decimal::ZERO));
        assert!(result.is_feasible());
    }

    #[test]
    fn zero_income_has_no_dsr_capacity() {
        let inputs = SimulatorInputs {
            annual_income: Manwon::ZERO,
            ..SimulatorInputs::default()
        };

        let result = Engine::default().compute(&inputs);

        assert_eq!(result.max_loan_dsr, Manwon::ZERO);
        assert_eq!(result.max_loan_possible, Manwon::ZERO);
        assert_eq!(result.dsr_ratio, None);
        assert!(!result.is_dsr_safe);
        assert!(!result.is_cash_flow_safe);
    }

    #[test]
    fn existing_debt_beyond_cap_zeroes_dsr_limit() {
        let inputs = SimulatorInputs {
            other_annual_debt_payment: manwon(dec!(4000)),
            ..SimulatorInputs::default()
        };

        let limits = loan_limits(&SimulationConfig::korea_2025(), &inputs);

        assert_eq!(limits.annual_dsr_ceiling, manwon(dec!(-800)));
        assert_eq!(limits.dsr_limit, Manwon::ZERO);
    }

    #[test]
    fn zero_rate_and_zero_term_do_not_panic() {
        let inputs = SimulatorInputs {
            mortgage_rate: Decimal::ZERO,
            loan_term_years: 0,
            ..SimulatorInputs::default()
        };

        let result = Engine::default().compute(&inputs);

        assert_eq!(result.max_loan_dsr, Manwon::ZERO);
        // With no term the whole loan counts as due in the first month.
        assert_eq!(result.monthly_payment, manwon(dec!(48680)));
        assert!(!result.is_dsr_safe);
    }

    #[test]
    fn near_zero_rate_over_millions_of_years() {
        let inputs = SimulatorInputs {
            mortgage_rate: Decimal::new(1, 16),
            loan_term_years: 5_000_000,
            ..SimulatorInputs::default()
        };

        let result = Engine::default().compute(&inputs);

        // Stressed at 1.5%, the DSR limit is the perpetuity 3200 / 12 / 0.00125.
        assert!((result.max_loan_dsr.value() - dec!(213333.3333)).abs() < dec!(0.001));
        // The nominal rate is negligible: 48680 spread over sixty million months.
        assert!((result.monthly_payment.value() - dec!(0.000811333)).abs() < dec!(0.000001));
    }

    #[test]
    fn ltv_caps_a_high_income_household() {
        let inputs = SimulatorInputs {
            annual_income: manwon(dec!(50000)),
            ..SimulatorInputs::default()
        };

        let result = Engine::default().compute(&inputs);

        assert_eq!(result.max_loan_possible, manwon(dec!(63000)));
        // 44760 + 63000 − 93440
        assert_eq!(result.cash_balance, manwon(dec!(14320)));
    }

    #[test]
    fn top_bracket_purchase_uses_flat_override() {
        let inputs = SimulatorInputs {
            target_house_price: manwon(dec!(110000)),
            target_size_over_85: true,
            ..SimulatorInputs::default()
        };

        let result = Engine::default().compute(&inputs);

        assert_eq!(
            result.details.acquisition.path,
            AcquisitionTaxPath::FlatOverride
        );
        assert_eq!(result.acquisition_tax, manwon(dec!(3850)));
        assert_eq!(result.new_house_agent_fee, manwon(dec!(550)));
    }

    #[test]
    fn engine_new_rejects_invalid_config() {
        let mut config = SimulationConfig::korea_2025();
        config.fees.brokerage_tiers.clear();

        assert_eq!(Engine::new(config), Err(ConfigError::EmptyBrokerageTiers));
    }

    #[test]
    fn engine_uses_supplied_config() {
        let mut config = SimulationConfig::korea_2025();
        config.fees.moving_cost = manwon(dec!(500));
        let engine = Engine::new(config).expect("valid config");

        let result = engine.compute(&SimulatorInputs::default());

        assert_eq!(result.moving_cost, manwon(dec!(500)));
        assert_eq!(result.total_closing_costs, manwon(dec!(3740)));
    }

    #[test]
    fn compute_is_idempotent() {
        let engine = Engine::default();
        let inputs = SimulatorInputs::default();

        assert_eq!(engine.compute(&inputs), engine.compute(&inputs));
    }

    // =========================================================================
    // logging
    // =========================================================================

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn warnings_from_loan_limits(inputs: &SimulatorInputs) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            loan_limits(&SimulationConfig::korea_2025(), inputs);
        });

        let bytes = logs.0.lock().expect("log buffer").clone();
        String::from_utf8(bytes).expect("utf-8 logs")
    }

    #[test]
    fn zero_income_does_not_warn() {
        let inputs = SimulatorInputs {
            annual_income: Manwon::ZERO,
            ..SimulatorInputs::default()
        };

        assert_eq!(warnings_from_loan_limits(&inputs), "");
    }

    #[test]
    fn existing_debt_beyond_cap_warns() {
        let inputs = SimulatorInputs {
            other_annual_debt_payment: manwon(dec!(4000)),
            ..SimulatorInputs::default()
        };

        assert!(warnings_from_loan_limits(&inputs).contains("existing debt exhausts DSR capacity"));
    }
}
