mod error;
mod scenario;

use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use scenario::Scenario;
use sg_chemistry::{ChemistryLevels, DesignChemistry};
use sg_fouling::{CleaningMethod, MaintenanceArgs};
use sg_unit::{SteamGeneratorConfig, SteamGeneratorUnit};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(about = "Steam generator unit simulator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default unit configuration as YAML
    Defaults,
    /// Print the design-point state map as JSON
    Snapshot {
        /// Unit configuration YAML (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run a scenario and print sampled reports as JSON
    Run {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Sample every N steps (the last step is always sampled)
        #[arg(long, default_value_t = 100)]
        every: u64,
    },
    /// Run a scenario, then apply one maintenance action
    Maintain {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Maintenance action name
        action: String,
        /// Cleaning method for cleaning actions
        #[arg(long, value_parser = parse_cleaning)]
        cleaning_type: Option<CleaningMethod>,
    },
}

fn parse_cleaning(s: &str) -> Result<CleaningMethod, String> {
    match s {
        "chemical" => Ok(CleaningMethod::Chemical),
        "mechanical" => Ok(CleaningMethod::Mechanical),
        "combined" => Ok(CleaningMethod::Combined),
        other => Err(format!(
            "unknown cleaning type '{other}' (chemical, mechanical, combined)"
        )),
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Defaults => cmd_defaults(),
        Commands::Snapshot { config } => cmd_snapshot(config.as_deref()),
        Commands::Run { scenario, every } => cmd_run(&scenario, every),
        Commands::Maintain {
            scenario,
            action,
            cleaning_type,
        } => cmd_maintain(&scenario, &action, cleaning_type),
    }
}

fn cmd_defaults() -> CliResult<()> {
    print!("{}", serde_yaml::to_string(&SteamGeneratorConfig::default())?);
    Ok(())
}

fn cmd_snapshot(config_path: Option<&Path>) -> CliResult<()> {
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
            serde_yaml::from_str(&text)?
        }
        None => SteamGeneratorConfig::default(),
    };
    let chemistry = Arc::new(DesignChemistry::new(ChemistryLevels::default()));
    let unit = SteamGeneratorUnit::new(config, chemistry)?;
    println!("{}", serde_json::to_string_pretty(&unit.state_map())?);
    Ok(())
}

fn cmd_run(scenario_path: &Path, every: u64) -> CliResult<()> {
    let scenario = Scenario::load(scenario_path)?;
    let mut unit = scenario.build_unit()?;
    let output = scenario.run(&mut unit, every);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_maintain(
    scenario_path: &Path,
    action: &str,
    cleaning_type: Option<CleaningMethod>,
) -> CliResult<()> {
    let scenario = Scenario::load(scenario_path)?;
    let mut unit = scenario.build_unit()?;
    scenario.run(&mut unit, 0);

    let args = MaintenanceArgs {
        cleaning_type,
        ..Default::default()
    };
    let result = unit.perform_maintenance(action, &args);
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        return Err(CliError::MaintenanceFailed {
            action: action.to_string(),
            findings: result.findings,
        });
    }
    Ok(())
}
