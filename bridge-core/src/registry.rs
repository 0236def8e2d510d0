use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::calculations::Engine;
use crate::models::{ConfigError, SimulationConfig};

/// Registry of [`SimulationConfig`] instances, keyed by regulatory year.
///
/// Typical lifetime:
/// 1. Create with `ConfigRegistry::new()` (or `ConfigRegistry::builtin()`).
/// 2. Call `register` once per loaded configuration.
/// 3. Look up by year with `get`, or by transaction date with `effective_on`.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: BTreeMap<i32, SimulationConfig>,
}

impl ConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            configs: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in 2025 configuration.
    pub fn builtin() -> Self {
        let config = SimulationConfig::korea_2025();
        Self {
            configs: BTreeMap::from([(config.regulatory_year, config)]),
        }
    }

    /// Validate and register a configuration.
    ///
    /// A configuration already registered for the same year is replaced.
    ///
    /// # Errors
    /// Returns the [`ConfigError`] from validation; the registry is left unchanged.
    pub fn register(
        &mut self,
        config: SimulationConfig,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        let year = config.regulatory_year;
        if self.configs.insert(year, config).is_some() {
            warn!(year, "replaced registered configuration");
        }
        Ok(())
    }

    /// Registered years in ascending order.
    pub fn available_years(&self) -> Vec<i32> {
        self.configs.keys().copied().collect()
    }

    /// # Errors
    /// * [`ConfigError::UnknownRegulatoryYear`] when nothing is registered
    ///   for `year`.
    pub fn get(
        &self,
        year: i32,
    ) -> Result<&SimulationConfig, ConfigError> {
        self.configs
            .get(&year)
            .ok_or_else(|| ConfigError::UnknownRegulatoryYear {
                year,
                available: self.available_years(),
            })
    }

    /// The latest configuration already in force on `date`.
    pub fn effective_on(
        &self,
        date: NaiveDate,
    ) -> Option<&SimulationConfig> {
        self.configs
            .values()
            .filter(|c| c.effective_from <= date)
            .max_by_key(|c| c.effective_from)
    }

    /// Build an engine for `year`.
    pub fn engine(
        &self,
        year: i32,
    ) -> Result<Engine, ConfigError> {
        Engine::new(self.get(year)?.clone())
    }
}
