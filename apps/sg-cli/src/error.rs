//! Errors surfaced by the command-line runner.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported scenario version {found} (supported: {supported})")]
    ScenarioVersion { found: u32, supported: u32 },

    #[error("Simulation setup failed: {0}")]
    Sim(#[from] sg_unit::SimError),

    #[error("Maintenance action '{action}' failed: {findings}")]
    MaintenanceFailed { action: String, findings: String },
}

pub type CliResult<T> = Result<T, CliError>;
