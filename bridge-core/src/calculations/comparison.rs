//! Side-by-side evaluation of two scenarios.

use serde::{Deserialize, Serialize};

use crate::Manwon;
use crate::calculations::Engine;
use crate::models::{CalculationResult, ScenarioId, ScenarioPair};

/// One evaluated scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub id: ScenarioId,
    pub name: String,
    pub result: CalculationResult,
}

/// Results for A and B plus the differences between them.
///
/// Every delta is `B − A`.
///
/// # Example
///
/// ```
/// use bridge_core::{Engine, ScenarioComparison, ScenarioId, ScenarioPair};
/// use rust_decimal_macros::dec;
///
/// let comparison = ScenarioComparison::compute(&Engine::default(), &ScenarioPair::default());
///
/// assert_eq!(comparison.preferred, ScenarioId::A);
/// assert_eq!(comparison.final_loan_delta.value(), dec!(15960));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub a: ScenarioOutcome,
    pub b: ScenarioOutcome,
    pub cash_balance_delta: Manwon,
    pub final_loan_delta: Manwon,
    pub monthly_payment_delta: Manwon,
    pub closing_costs_delta: Manwon,
    /// Scenario with the larger cash balance; A on a tie.
    pub preferred: ScenarioId,
}

impl ScenarioComparison {
    pub fn compute(
        engine: &Engine,
        pair: &ScenarioPair,
    ) -> Self {
        let evaluate = |id: ScenarioId| {
            let scenario = pair.get(id);
            ScenarioOutcome {
                id,
                name: scenario.name.clone(),
                result: engine.compute(&scenario.inputs),
            }
        };
        let a = evaluate(ScenarioId::A);
        let b = evaluate(ScenarioId::B);

        let preferred = if b.result.cash_balance > a.result.cash_balance {
            ScenarioId::B
        } else {
            ScenarioId::A
        };

        Self {
            cash_balance_delta: b.result.cash_balance - a.result.cash_balance,
            final_loan_delta: b.result.final_loan_amount - a.result.final_loan_amount,
            monthly_payment_delta: b.result.monthly_payment - a.result.monthly_payment,
            closing_costs_delta: b.result.total_closing_costs - a.result.total_closing_costs,
            preferred,
            a,
            b,
        }
    }

    pub fn outcome(
        &self,
        id: ScenarioId,
    ) -> &ScenarioOutcome {
        match id {
            ScenarioId::A => &self.a,
            ScenarioId::B => &self.b,
        }
    }
}
