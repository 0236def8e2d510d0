//! Loader for regulatory configurations.
//!
//! A configuration is a TOML file. The two rate tables may be written inline
//! or kept in CSV files named relative to the TOML file:
//!
//! ```toml
//! regulatory_year = 2025
//! effective_from = "2025-01-01"
//! brackets_csv = "brackets_2025.csv"
//! brokerage_csv = "brokerage_2025.csv"
//!
//! [capital_gains]
//! exemption_ceiling = 120000
//! basic_deduction = 250
//! max_long_term_deduction = 0.80
//! local_tax_multiplier = 1.10
//!
//! [acquisition]
//! low_threshold = 60000
//! # ...
//! ```
//!
//! ## CSV formats
//!
//! | File      | Columns                                    |
//! |-----------|--------------------------------------------|
//! | brackets  | `upper_bound,rate,progressive_deduction`   |
//! | brokerage | `upper_bound,rate`                         |
//!
//! An empty `upper_bound` marks the unbounded final row.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use bridge_core::{
    AcquisitionConfig, BrokerageTier, CapitalGainsConfig, ConfigError, FeeConfig, LoanConfig,
    Manwon, SimulationConfig, TaxBracket,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigLoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("{0} table given both inline and as a CSV file")]
    DuplicateTable(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

impl From<csv::Error> for ConfigLoaderError {
    fn from(err: csv::Error) -> Self {
        ConfigLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the capital-gains bracket CSV.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub progressive_deduction: Decimal,
}

impl From<BracketRecord> for TaxBracket {
    fn from(record: BracketRecord) -> Self {
        TaxBracket {
            upper_bound: record.upper_bound.map(Manwon::new),
            rate: record.rate,
            progressive_deduction: Manwon::new(record.progressive_deduction),
        }
    }
}

/// A single row of the brokerage tier CSV.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BrokerageTierRecord {
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl From<BrokerageTierRecord> for BrokerageTier {
    fn from(record: BrokerageTierRecord) -> Self {
        BrokerageTier {
            upper_bound: record.upper_bound.map(Manwon::new),
            rate: record.rate,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// TOML layout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    regulatory_year: i32,
    effective_from: NaiveDate,
    brackets_csv: Option<PathBuf>,
    brokerage_csv: Option<PathBuf>,
    capital_gains: CapitalGainsSection,
    acquisition: AcquisitionConfig,
    loan: LoanConfig,
    fees: FeeSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CapitalGainsSection {
    exemption_ceiling: Manwon,
    basic_deduction: Manwon,
    max_long_term_deduction: Decimal,
    local_tax_multiplier: Decimal,
    #[serde(default)]
    brackets: Vec<TaxBracket>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeeSection {
    moving_cost: Manwon,
    #[serde(default)]
    brokerage_tiers: Vec<BrokerageTier>,
}

/// Builds validated [`SimulationConfig`]s from TOML and CSV sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse bracket rows from a CSV reader.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<TaxBracket>, ConfigLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut brackets = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            brackets.push(record.into());
        }

        Ok(brackets)
    }

    /// Parse brokerage tier rows from a CSV reader.
    pub fn parse_brokerage_tiers<R: Read>(
        reader: R
    ) -> Result<Vec<BrokerageTier>, ConfigLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut tiers = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BrokerageTierRecord = result?;
            tiers.push(record.into());
        }

        Ok(tiers)
    }

    /// Parse a configuration from TOML text.
    ///
    /// CSV paths in the text are resolved against the current directory.
    pub fn from_toml_str(contents: &str) -> Result<SimulationConfig, ConfigLoaderError> {
        Self::build(contents, Path::new("."))
    }

    /// Load a configuration file, resolving CSV paths against its directory.
    pub fn load_file(path: impl AsRef<Path>) -> Result<SimulationConfig, ConfigLoaderError> {
        let path = path.as_ref();
        let contents = read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let config = Self::build(&contents, base_dir)?;
        info!(
            year = config.regulatory_year,
            path = %path.display(),
            "loaded regulatory configuration"
        );
        Ok(config)
    }

    fn build(
        contents: &str,
        base_dir: &Path,
    ) -> Result<SimulationConfig, ConfigLoaderError> {
        let file: ConfigFile = toml::from_str(contents)?;

        let brackets = match &file.brackets_csv {
            Some(_) if !file.capital_gains.brackets.is_empty() => {
                return Err(ConfigLoaderError::DuplicateTable("capital gains bracket"));
            }
            Some(csv_path) => {
                Self::parse_brackets(read_to_string(&base_dir.join(csv_path))?.as_bytes())?
            }
            None => file.capital_gains.brackets,
        };
        let brokerage_tiers = match &file.brokerage_csv {
            Some(_) if !file.fees.brokerage_tiers.is_empty() => {
                return Err(ConfigLoaderError::DuplicateTable("brokerage tier"));
            }
            Some(csv_path) => {
                Self::parse_brokerage_tiers(read_to_string(&base_dir.join(csv_path))?.as_bytes())?
            }
            None => file.fees.brokerage_tiers,
        };

        let config = SimulationConfig {
            regulatory_year: file.regulatory_year,
            effective_from: file.effective_from,
            capital_gains: CapitalGainsConfig {
                exemption_ceiling: file.capital_gains.exemption_ceiling,
                basic_deduction: file.capital_gains.basic_deduction,
                max_long_term_deduction: file.capital_gains.max_long_term_deduction,
                local_tax_multiplier: file.capital_gains.local_tax_multiplier,
                brackets,
            },
            acquisition: file.acquisition,
            loan: file.loan,
            fees: FeeConfig {
                brokerage_tiers,
                moving_cost: file.fees.moving_cost,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

fn read_to_string(path: &Path) -> Result<String, ConfigLoaderError> {
    fs::read_to_string(path).map_err(|source| ConfigLoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const BRACKETS_CSV: &str = "upper_bound,rate,progressive_deduction
1200,0.06,0
4600,0.15,108
8800,0.24,522
15000,0.35,1490
30000,0.38,1940
50000,0.40,2540
100000,0.42,3540
,0.45,6540
";

    const INLINE_TOML: &str = r#"
regulatory_year = 2025
effective_from = "2025-01-01"

[capital_gains]
exemption_ceiling = 120000
basic_deduction = 250
max_long_term_deduction = 0.80
local_tax_multiplier = 1.10
brackets = [
    { upper_bound = 1200, rate = 0.06, progressive_deduction = 0 },
    { upper_bound = 4600, rate = 0.15, progressive_deduction = 108 },
    { upper_bound = 8800, rate = 0.24, progressive_deduction = 522 },
    { upper_bound = 15000, rate = 0.35, progressive_deduction = 1490 },
    { upper_bound = 30000, rate = 0.38, progressive_deduction = 1940 },
    { upper_bound = 50000, rate = 0.40, progressive_deduction = 2540 },
    { upper_bound = 100000, rate = 0.42, progressive_deduction = 3540 },
    { rate = 0.45, progressive_deduction = 6540 },
]

[acquisition]
low_threshold = 60000
high_threshold = 90000
low_rate = 0.01
high_rate = 0.03
education_surtax = 0.001
rural_surtax = 0.002
top_flat_rate = 0.033
top_flat_rate_oversized = 0.035

[loan]
dsr_limit = 0.40
stress_rate_add_on = 1.5
ltv_max = 80

[fees]
moving_cost = 200
brokerage_tiers = [
    { upper_bound = 5000, rate = 0.006 },
    { upper_bound = 20000, rate = 0.005 },
    { upper_bound = 90000, rate = 0.004 },
    { upper_bound = 120000, rate = 0.005 },
    { upper_bound = 150000, rate = 0.006 },
    { rate = 0.007 },
]
"#;

    // =========================================================================
    // CSV parsing
    // =========================================================================

    #[test]
    fn test_parse_brackets_csv() {
        let brackets =
            ConfigLoader::parse_brackets(BRACKETS_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(brackets, SimulationConfig::korea_2025().capital_gains.brackets);
    }

    #[test]
    fn test_parse_unbounded_row() {
        let csv = "upper_bound,rate\n,0.007";

        let tiers = ConfigLoader::parse_brokerage_tiers(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            tiers,
            vec![BrokerageTier {
                upper_bound: None,
                rate: dec!(0.007),
            }]
        );
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "upper_bound,rate\n1200,0.06";

        let err = ConfigLoader::parse_brackets(csv.as_bytes())
            .expect_err("Should fail for missing column");
        let ConfigLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "upper_bound,rate\nabc,0.06";

        let err = ConfigLoader::parse_brokerage_tiers(csv.as_bytes())
            .expect_err("Should fail for invalid decimal");
        assert!(matches!(err, ConfigLoaderError::CsvParse(_)));
    }

    // =========================================================================
    // TOML parsing
    // =========================================================================

    #[test]
    fn test_inline_toml_matches_builtin() {
        let config = ConfigLoader::from_toml_str(INLINE_TOML).expect("Failed to parse TOML");

        assert_eq!(config, SimulationConfig::korea_2025());
    }

    #[test]
    fn test_toml_rejects_unknown_field() {
        let toml = INLINE_TOML.replace("moving_cost = 200", "moving_cost = 200\nmoving_costs = 1");

        let err = ConfigLoader::from_toml_str(&toml).expect_err("Should reject unknown field");
        assert!(matches!(err, ConfigLoaderError::TomlParse(_)));
    }

    #[test]
    fn test_toml_is_validated() {
        let toml = INLINE_TOML.replace("dsr_limit = 0.40", "dsr_limit = 1.40");

        let err = ConfigLoader::from_toml_str(&toml).expect_err("Should fail validation");
        assert!(matches!(
            err,
            ConfigLoaderError::Invalid(ConfigError::RatioOutOfRange {
                field: "loan.dsr_limit",
                ..
            })
        ));
    }

    #[test]
    fn test_toml_rejects_inline_and_csv_table() {
        let toml = INLINE_TOML.replace(
            "effective_from = \"2025-01-01\"",
            "effective_from = \"2025-01-01\"\nbrackets_csv = \"brackets.csv\"",
        );

        let err = ConfigLoader::from_toml_str(&toml).expect_err("Should reject duplicate table");
        assert!(matches!(
            err,
            ConfigLoaderError::DuplicateTable("capital gains bracket")
        ));
    }

    #[test]
    fn test_missing_csv_file_is_io_error() {
        let toml = INLINE_TOML.replace(
            "effective_from = \"2025-01-01\"",
            "effective_from = \"2025-01-01\"\nbrokerage_csv = \"does-not-exist.csv\"",
        );
        let toml = toml
            .split("brokerage_tiers = [")
            .next()
            .expect("split yields a prefix")
            .to_string();

        let err = ConfigLoader::from_toml_str(&toml).expect_err("Should fail to read CSV");
        let ConfigLoaderError::Io { path, .. } = err else {
            panic!("Expected Io error, got: {:?}", err);
        };
        assert!(path.ends_with("does-not-exist.csv"));
    }
}
