use std::path::PathBuf;

use anyhow::{Context, Result};
use bridge_core::{
    ConfigRegistry, Engine, Scenario, ScenarioComparison, ScenarioId, ScenarioOutcome,
    ScenarioPair, SimulatorInputs, criteria_summary,
};
use bridge_data::{ConfigLoader, ScenarioLoader};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod report;

use report::{ComparisonReport, CriteriaReport, ResultReport};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Sell-one-home, buy-another affordability calculator.
///
/// Estimates capital-gains and acquisition taxes, brokerage fees and the
/// LTV/DSR loan limits, then reports whether the move can be financed.
/// Amounts are in man-won (10,000 KRW).
#[derive(Debug, Parser)]
#[command(name = "bridge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate one scenario.
    Compute {
        /// Scenario file (TOML). Defaults to the built-in household.
        #[arg(long)]
        scenario: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleArgs,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Evaluate scenarios A and B side by side.
    Compare {
        /// Scenario pair file (TOML with [a] and [b]). Defaults to the built-in pair.
        #[arg(long)]
        scenario: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleArgs,

        /// Print the comparison as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the regulatory rules being applied.
    Criteria {
        #[command(flatten)]
        rules: RuleArgs,

        /// Print the criteria as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Which regulatory configuration to apply.
#[derive(Debug, Args)]
struct RuleArgs {
    /// Regulatory configuration file (TOML), added to the built-in 2025 rules.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regulatory year to apply. Defaults to the loaded file's year, else the latest.
    #[arg(long, conflicts_with = "as_of")]
    year: Option<i32>,

    /// Apply the rules in force on this date (YYYY-MM-DD).
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

impl RuleArgs {
    fn engine(&self) -> Result<Engine> {
        let mut registry = ConfigRegistry::builtin();

        let loaded_year = match &self.config {
            Some(path) => {
                let config = ConfigLoader::load_file(path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?;
                let year = config.regulatory_year;
                registry.register(config)?;
                Some(year)
            }
            None => None,
        };

        if let Some(date) = self.as_of {
            let config = registry
                .effective_on(date)
                .with_context(|| format!("No regulatory configuration in force on {date}"))?;
            debug!(year = config.regulatory_year, %date, "selected configuration by date");
            return Ok(Engine::new(config.clone())?);
        }

        let year = self
            .year
            .or(loaded_year)
            .or_else(|| registry.available_years().last().copied())
            .context("No regulatory configuration available")?;
        debug!(year, "selected configuration by year");
        Ok(registry.engine(year)?)
    }
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
/// * Writes to stderr so `--json` output stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── commands ────────────────────────────────────────────────────────────────

fn compute(
    scenario: Option<PathBuf>,
    rules: &RuleArgs,
    json: bool,
) -> Result<()> {
    let engine = rules.engine()?;
    let scenario = match scenario {
        Some(path) => ScenarioLoader::load_single(&path)
            .with_context(|| format!("Failed to load scenario: {}", path.display()))?,
        None => Scenario::new(ScenarioId::A, "Scenario A", SimulatorInputs::default()),
    };
    scenario
        .inputs
        .validate()
        .with_context(|| format!("Invalid inputs in {}", scenario.name))?;

    let outcome = ScenarioOutcome {
        id: scenario.id,
        name: scenario.name,
        result: engine.compute(&scenario.inputs),
    };
    info!(
        feasible = outcome.result.is_feasible(),
        "computed {}", outcome.name
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!(
            "{}",
            ResultReport {
                outcome: &outcome,
                config: engine.config(),
            }
        );
    }
    Ok(())
}

fn compare(
    scenario: Option<PathBuf>,
    rules: &RuleArgs,
    json: bool,
) -> Result<()> {
    let engine = rules.engine()?;
    let pair = match scenario {
        Some(path) => ScenarioLoader::load_pair(&path)
            .with_context(|| format!("Failed to load scenario pair: {}", path.display()))?,
        None => ScenarioPair::default(),
    };
    for scenario in [&pair.a, &pair.b] {
        scenario
            .inputs
            .validate()
            .with_context(|| format!("Invalid inputs in {}", scenario.name))?;
    }

    let comparison = ScenarioComparison::compute(&engine, &pair);

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!(
            "{}",
            ComparisonReport {
                comparison: &comparison,
                config: engine.config(),
            }
        );
    }
    Ok(())
}

fn criteria(
    rules: &RuleArgs,
    json: bool,
) -> Result<()> {
    let engine = rules.engine()?;
    let criteria = criteria_summary(engine.config());

    if json {
        println!("{}", serde_json::to_string_pretty(&criteria)?);
    } else {
        print!(
            "{}",
            CriteriaReport {
                year: engine.config().regulatory_year,
                criteria: &criteria,
            }
        );
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Compute {
            scenario,
            rules,
            json,
        } => compute(scenario, &rules, json),
        Command::Compare {
            scenario,
            rules,
            json,
        } => compare(scenario, &rules, json),
        Command::Criteria { rules, json } => criteria(&rules, json),
    }
}
