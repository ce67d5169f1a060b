//! Chemistry provider interface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Grouped chemistry flows, e.g. `system_chemistry -> { iron: 0.1, .. }`.
pub type ChemistryFlows = BTreeMap<String, BTreeMap<String, f64>>;

/// Free-form effects payload forwarded to the provider without interpretation.
pub type ChemistryUpdate = BTreeMap<String, f64>;

/// Canonical keys shared by providers and update payloads.
pub mod keys {
    pub const PH: &str = "ph";
    pub const PH_SETPOINT: &str = "ph_setpoint";
    pub const IRON: &str = "iron";
    pub const COPPER: &str = "copper";
    pub const SILICA: &str = "silica";
    pub const DISSOLVED_OXYGEN: &str = "dissolved_oxygen";
    pub const BORIC_ACID: &str = "boric_acid";
    pub const LITHIUM: &str = "lithium";
    pub const PRIMARY_PH: &str = "primary_ph";
    pub const PRIMARY_DISSOLVED_OXYGEN: &str = "primary_dissolved_oxygen";
    pub const RESET_TO_DESIGN: &str = "reset_to_design";
}

/// Chemistry snapshot as seen by a consumer.
///
/// Any field may be absent; consumers substitute their own design values.
/// Concentrations are ppm, pH is dimensionless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemistryState {
    pub ph: Option<f64>,
    pub iron_ppm: Option<f64>,
    pub copper_ppm: Option<f64>,
    pub silica_ppm: Option<f64>,
    pub dissolved_oxygen_ppm: Option<f64>,
    pub boric_acid_ppm: Option<f64>,
    pub lithium_ppm: Option<f64>,
    pub primary_ph: Option<f64>,
    pub primary_dissolved_oxygen_ppm: Option<f64>,
}

impl ChemistryState {
    /// Look up a species by its canonical key. Unknown keys yield `None`.
    pub fn get(&self, key: &str) -> Option<f64> {
        let value = match key {
            keys::PH => self.ph,
            keys::IRON => self.iron_ppm,
            keys::COPPER => self.copper_ppm,
            keys::SILICA => self.silica_ppm,
            keys::DISSOLVED_OXYGEN => self.dissolved_oxygen_ppm,
            keys::BORIC_ACID => self.boric_acid_ppm,
            keys::LITHIUM => self.lithium_ppm,
            keys::PRIMARY_PH => self.primary_ph,
            keys::PRIMARY_DISSOLVED_OXYGEN => self.primary_dissolved_oxygen_ppm,
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// Value for `key`, or `default` when the provider does not report it.
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }
}

/// Interface implemented by the external water-chemistry system.
///
/// Units hold providers through `Arc<dyn ChemistryProvider>`; the provider
/// owns its own interior mutability so updates take `&self`.
pub trait ChemistryProvider: Send + Sync + fmt::Debug {
    /// Chemistry flows grouped by source.
    fn chemistry_flows(&self) -> ChemistryFlows;

    /// Current concentrations.
    fn chemistry_state(&self) -> ChemistryState;

    /// Apply externally computed effects. Unknown keys are ignored.
    fn update_chemistry_effects(&self, update: &ChemistryUpdate);
}
