//! Fouling models for a PWR steam generator.
//!
//! Provides:
//! - Shared deposition kinetics and operating clock (`kernel`)
//! - Maintenance dispatch contract and bounded history (`maintenance`)
//! - Tube support plate crevice fouling on the secondary side (`tsp`)
//! - Tube interior scale on the primary side (`tube_interior`)
//!
//! Both models read chemistry from a shared [`sg_chemistry::ChemistryProvider`]
//! and implement [`FoulingModel`].

pub mod error;
pub mod kernel;
pub mod maintenance;
pub mod model;
pub mod tsp;
pub mod tube_interior;

pub use error::{FoulingError, FoulingResult};
pub use kernel::{
    FoulingClock, concentration_multiplier, ph_factor, temperature_factor, velocity_factor,
};
pub use maintenance::{
    CleaningMethod, MaintenanceArgs, MaintenanceHistory, MaintenanceRecord, MaintenanceResult,
    RadiationExposure,
};
pub use model::FoulingModel;
pub use tsp::{
    DepositSpecies, FoulingStage, SecondaryChemistryDefaults, ShutdownReason, TSP_ACTIONS,
    TspFoulingConfig, TspFoulingModel, TspOutputs,
};
pub use tube_interior::{
    PrimaryChemistryTargets, PrimaryFlowRestriction, ScaleComposition, TUBE_INTERIOR_ACTIONS,
    TubeInteriorConfig, TubeInteriorFoulingModel, TubeInteriorOutputs,
};
