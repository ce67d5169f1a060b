//! Design-point chemistry provider.

use crate::provider::{
    ChemistryFlows, ChemistryProvider, ChemistryState, ChemistryUpdate, keys,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

/// Fraction of the remaining pH error closed per setpoint update.
const PH_APPROACH_RATE: f64 = 0.3;

/// Concrete chemistry levels (ppm unless noted).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemistryLevels {
    pub ph: f64,
    pub iron_ppm: f64,
    pub copper_ppm: f64,
    pub silica_ppm: f64,
    pub dissolved_oxygen_ppm: f64,
    pub boric_acid_ppm: f64,
    pub lithium_ppm: f64,
    pub primary_ph: f64,
    pub primary_dissolved_oxygen_ppm: f64,
}

impl Default for ChemistryLevels {
    fn default() -> Self {
        Self {
            ph: 9.2,
            iron_ppm: 0.1,
            copper_ppm: 0.05,
            silica_ppm: 20.0,
            dissolved_oxygen_ppm: 0.005,
            boric_acid_ppm: 1000.0,
            lithium_ppm: 2.0,
            primary_ph: 7.2,
            primary_dissolved_oxygen_ppm: 0.005,
        }
    }
}

impl ChemistryLevels {
    fn apply(&mut self, key: &str, value: f64) -> bool {
        let slot = match key {
            keys::PH => &mut self.ph,
            keys::IRON => &mut self.iron_ppm,
            keys::COPPER => &mut self.copper_ppm,
            keys::SILICA => &mut self.silica_ppm,
            keys::DISSOLVED_OXYGEN => &mut self.dissolved_oxygen_ppm,
            keys::BORIC_ACID => &mut self.boric_acid_ppm,
            keys::LITHIUM => &mut self.lithium_ppm,
            keys::PRIMARY_PH => &mut self.primary_ph,
            keys::PRIMARY_DISSOLVED_OXYGEN => &mut self.primary_dissolved_oxygen_ppm,
            keys::PH_SETPOINT => {
                self.ph += (value - self.ph) * PH_APPROACH_RATE;
                return true;
            }
            _ => return false,
        };
        *slot = value.max(0.0);
        true
    }
}

/// Provider that reports fixed levels until told otherwise.
#[derive(Debug, Default)]
pub struct DesignChemistry {
    design: ChemistryLevels,
    levels: RwLock<ChemistryLevels>,
}

impl DesignChemistry {
    pub fn new(levels: ChemistryLevels) -> Self {
        Self {
            design: levels,
            levels: RwLock::new(levels),
        }
    }

    /// Current levels.
    pub fn levels(&self) -> ChemistryLevels {
        *self.levels.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChemistryProvider for DesignChemistry {
    fn chemistry_flows(&self) -> ChemistryFlows {
        let l = self.levels();
        let system: BTreeMap<String, f64> = [
            (keys::PH, l.ph),
            (keys::IRON, l.iron_ppm),
            (keys::COPPER, l.copper_ppm),
            (keys::SILICA, l.silica_ppm),
            (keys::DISSOLVED_OXYGEN, l.dissolved_oxygen_ppm),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let primary: BTreeMap<String, f64> = [
            (keys::BORIC_ACID, l.boric_acid_ppm),
            (keys::LITHIUM, l.lithium_ppm),
            (keys::PRIMARY_PH, l.primary_ph),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let mut flows = ChemistryFlows::new();
        flows.insert("system_chemistry".to_string(), system);
        flows.insert("primary_chemistry".to_string(), primary);
        flows
    }

    fn chemistry_state(&self) -> ChemistryState {
        let l = self.levels();
        ChemistryState {
            ph: Some(l.ph),
            iron_ppm: Some(l.iron_ppm),
            copper_ppm: Some(l.copper_ppm),
            silica_ppm: Some(l.silica_ppm),
            dissolved_oxygen_ppm: Some(l.dissolved_oxygen_ppm),
            boric_acid_ppm: Some(l.boric_acid_ppm),
            lithium_ppm: Some(l.lithium_ppm),
            primary_ph: Some(l.primary_ph),
            primary_dissolved_oxygen_ppm: Some(l.primary_dissolved_oxygen_ppm),
        }
    }

    fn update_chemistry_effects(&self, update: &ChemistryUpdate) {
        let mut levels = self.levels.write().unwrap_or_else(|e| e.into_inner());
        if update.get(keys::RESET_TO_DESIGN).is_some_and(|v| *v > 0.0) {
            *levels = self.design;
        }
        for (key, &value) in update {
            if key == keys::RESET_TO_DESIGN || !value.is_finite() {
                continue;
            }
            if !levels.apply(key, value) {
                debug!(key = key.as_str(), "ignoring unknown chemistry key");
            }
        }
    }
}
