//! Loader for scenario files.
//!
//! A single scenario names its inputs at the top level; a comparison puts
//! two scenarios under `[a]` and `[b]`. Omitted inputs take the default
//! household's values.
//!
//! ```toml
//! name = "Move up"
//!
//! [inputs]
//! annual_income = 9000
//! target_house_price = 100000
//! ```
//!
//! ```toml
//! [a]
//! name = "Stay local"
//! [a.inputs]
//! target_house_price = 90000
//!
//! [b]
//! name = "Move up"
//! [b.inputs]
//! target_house_price = 110000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bridge_core::{Scenario, ScenarioId, ScenarioPair, SimulatorInputs};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioLoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Expected a single scenario but found an [a]/[b] pair")]
    ExpectedSingle,

    #[error("Scenario {} is missing from the comparison file", .0.as_str())]
    MissingScenario(ScenarioId),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioSection {
    name: Option<String>,
    #[serde(default)]
    inputs: SimulatorInputs,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    name: Option<String>,
    inputs: Option<SimulatorInputs>,
    a: Option<ScenarioSection>,
    b: Option<ScenarioSection>,
}

fn default_name(id: ScenarioId) -> String {
    format!("Scenario {}", id.as_str())
}

impl ScenarioSection {
    fn into_scenario(
        self,
        id: ScenarioId,
    ) -> Scenario {
        Scenario::new(
            id,
            self.name.unwrap_or_else(|| default_name(id)),
            self.inputs,
        )
    }
}

/// Reads [`Scenario`]s and [`ScenarioPair`]s from TOML.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Parse a single scenario. It occupies slot A.
    pub fn parse_single(contents: &str) -> Result<Scenario, ScenarioLoaderError> {
        let file: ScenarioFile = toml::from_str(contents)?;
        if file.a.is_some() || file.b.is_some() {
            return Err(ScenarioLoaderError::ExpectedSingle);
        }

        Ok(ScenarioSection {
            name: file.name,
            inputs: file.inputs.unwrap_or_default(),
        }
        .into_scenario(ScenarioId::A))
    }

    /// Parse an `[a]`/`[b]` comparison.
    pub fn parse_pair(contents: &str) -> Result<ScenarioPair, ScenarioLoaderError> {
        let file: ScenarioFile = toml::from_str(contents)?;
        let a = file
            .a
            .ok_or(ScenarioLoaderError::MissingScenario(ScenarioId::A))?;
        let b = file
            .b
            .ok_or(ScenarioLoaderError::MissingScenario(ScenarioId::B))?;

        Ok(ScenarioPair {
            a: a.into_scenario(ScenarioId::A),
            b: b.into_scenario(ScenarioId::B),
        })
    }

    pub fn load_single(path: impl AsRef<Path>) -> Result<Scenario, ScenarioLoaderError> {
        let path = path.as_ref();
        let scenario = Self::parse_single(&read_to_string(path)?)?;
        info!(name = %scenario.name, path = %path.display(), "loaded scenario");
        Ok(scenario)
    }

    pub fn load_pair(path: impl AsRef<Path>) -> Result<ScenarioPair, ScenarioLoaderError> {
        let path = path.as_ref();
        let pair = Self::parse_pair(&read_to_string(path)?)?;
        info!(
            a = %pair.a.name,
            b = %pair.b.name,
            path = %path.display(),
            "loaded scenario pair"
        );
        Ok(pair)
    }
}

fn read_to_string(path: &Path) -> Result<String, ScenarioLoaderError> {
    fs::read_to_string(path).map_err(|source| ScenarioLoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
