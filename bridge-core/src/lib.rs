pub mod calculations;
pub mod criteria;
pub mod models;
pub mod money;
pub mod registry;

pub use calculations::{Engine, LoanLimits, ScenarioComparison, ScenarioOutcome, calculate_scenario};
pub use criteria::{Criterion, DsrBand, criteria_summary};
pub use models::*;
pub use money::Manwon;
pub use registry::ConfigRegistry;
