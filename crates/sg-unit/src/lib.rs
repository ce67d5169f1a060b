//! Steam generator unit model.
//!
//! Provides:
//! - Versioned unit configuration (`config`)
//! - Closed-form water/steam properties (`properties`)
//! - Level-dependent LMTD heat transfer with both fouling channels (`heat_transfer`)
//! - Fouling-derived flow clamps and pump energy (`flow_limits`)
//! - Secondary pressure, level, quality and void integration (`secondary`)
//! - The fixed-order step loop, snapshot and reset (`unit`)
//! - The unit maintenance action table (`maintenance`)
//!
//! The per-step path never errors; anomalies become [`Diagnostic`]s.

pub mod config;
pub mod error;
pub mod flow_limits;
pub mod heat_transfer;
pub mod inputs;
pub mod maintenance;
pub mod properties;
pub mod report;
pub mod secondary;
pub mod state;
pub mod unit;

pub use config::{CONFIG_VERSION, SteamGeneratorConfig};
pub use error::{SimError, SimResult};
pub use flow_limits::{ClampedFlow, PumpEnergy, SecondaryFlowLimit};
pub use heat_transfer::{HeatTransferGuard, HeatTransferInputs, HeatTransferResult};
pub use inputs::{MIN_TIME_STEP_S, StepInputs};
pub use maintenance::UNIT_ACTIONS;
pub use report::{Diagnostic, DiagnosticKind, StepReport};
pub use secondary::{SecondaryConditions, SecondaryDrive, SecondaryDynamics};
pub use state::{SteamGeneratorState, limits};
pub use unit::SteamGeneratorUnit;
