mod brokerage_tier;
mod calculation_result;
mod scenario;
mod simulation_config;
mod simulator_inputs;
mod tax_bracket;

pub use brokerage_tier::BrokerageTier;
pub use calculation_result::{CalculationResult, ResultDetails, Waterfall};
pub use scenario::{Scenario, ScenarioId, ScenarioPair};
pub use simulation_config::{
    AcquisitionConfig, CapitalGainsConfig, ConfigError, FeeConfig, LoanConfig, SimulationConfig,
};
pub use simulator_inputs::{InputError, SimulatorInputs};
pub use tax_bracket::TaxBracket;
