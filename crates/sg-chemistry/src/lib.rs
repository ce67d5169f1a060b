//! Water-chemistry boundary consumed by the steam generator models.
//!
//! Provides:
//! - `ChemistryProvider`, the three-method interface an external chemistry
//!   system implements (flows, state, effects update)
//! - `ChemistryState`, a snapshot where every species is optional
//! - `DesignChemistry`, a provider holding fixed design-point levels that
//!   accepts setpoint updates, for standalone runs and tests

pub mod design;
pub mod provider;

pub use design::{ChemistryLevels, DesignChemistry};
pub use provider::{ChemistryFlows, ChemistryProvider, ChemistryState, ChemistryUpdate, keys};
