//! File-backed sources for regulatory configurations and scenarios.

mod config_loader;
mod scenario_loader;

pub use config_loader::{BracketRecord, BrokerageTierRecord, ConfigLoader, ConfigLoaderError};
pub use scenario_loader::{ScenarioLoader, ScenarioLoaderError};
