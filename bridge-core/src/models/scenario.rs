use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::Manwon;
use crate::models::SimulatorInputs;

/// Slot a scenario occupies in a side-by-side comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioId {
    A,
    B,
}

impl ScenarioId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

/// A named set of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub inputs: SimulatorInputs,
}

impl Scenario {
    pub fn new(
        id: ScenarioId,
        name: impl Into<String>,
        inputs: SimulatorInputs,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            inputs,
        }
    }
}

/// The two scenarios a household weighs against each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPair {
    pub a: Scenario,
    pub b: Scenario,
}

impl ScenarioPair {
    pub fn get(
        &self,
        id: ScenarioId,
    ) -> &Scenario {
        match id {
            ScenarioId::A => &self.a,
            ScenarioId::B => &self.b,
        }
    }
}

impl Default for ScenarioPair {
    /// B sells slightly higher (6.5 eok) and buys a pricier 11 eok home.
    fn default() -> Self {
        Self {
            a: Scenario::new(ScenarioId::A, "Scenario A", SimulatorInputs::default()),
            b: Scenario::new(
                ScenarioId::B,
                "Scenario B",
                SimulatorInputs {
                    target_house_price: Manwon::new(dec!(110000)),
                    current_house_price: Manwon::new(dec!(65000)),
                    ..SimulatorInputs::default()
                },
            ),
        }
    }
}
