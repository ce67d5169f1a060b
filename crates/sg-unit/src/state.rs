//! Thermal-hydraulic state owned by one unit.

use crate::config::SteamGeneratorConfig;
use crate::properties::saturation_temperature;
use serde::{Deserialize, Serialize};
use sg_core::{StateMap, put};

/// Physical bounds enforced after every step.
pub mod limits {
    pub const MIN_PRESSURE_MPA: f64 = 1.0;
    pub const MAX_PRESSURE_MPA: f64 = 8.0;
    pub const MIN_LEVEL_M: f64 = 8.0;
    pub const MAX_LEVEL_M: f64 = 16.0;
    pub const MIN_QUALITY: f64 = 0.90;
    pub const MAX_QUALITY: f64 = 1.0;
    pub const MAX_VOID_FRACTION: f64 = 0.8;
}

/// Secondary-side and heat-transfer state of one steam generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteamGeneratorState {
    /// Primary inlet (hot leg) temperature (°C).
    pub primary_inlet_temp_c: f64,
    /// Primary outlet (cold leg) temperature (°C).
    pub primary_outlet_temp_c: f64,
    /// Secondary pressure (MPa).
    pub secondary_pressure_mpa: f64,
    /// Saturation temperature at the pressure the last step started from (°C).
    pub secondary_temperature_c: f64,
    /// Water level above the tube sheet (m).
    pub water_level_m: f64,
    pub steam_quality: f64,
    pub void_fraction: f64,
    /// Applied steam flow (kg/s).
    pub steam_flow: f64,
    /// Applied feedwater flow (kg/s).
    pub feedwater_flow: f64,
    pub feedwater_temp_c: f64,
    pub tube_wall_temp_c: f64,
    /// Heat transfer rate (W).
    pub heat_transfer_rate_w: f64,
    /// Clean overall coefficient (W/m²/K).
    pub overall_htc: f64,
    /// Heat flux used for the wall temperature (W/m²).
    pub heat_flux: f64,
}

impl SteamGeneratorState {
    /// Design-point operating state.
    pub fn design(config: &SteamGeneratorConfig) -> Self {
        Self {
            primary_inlet_temp_c: 327.0,
            primary_outlet_temp_c: 293.0,
            secondary_pressure_mpa: config.design_pressure_mpa,
            secondary_temperature_c: saturation_temperature(config.design_pressure_mpa),
            water_level_m: config.normal_water_level_m,
            steam_quality: 0.99,
            void_fraction: 0.45,
            steam_flow: config.design_steam_flow,
            feedwater_flow: config.design_feedwater_flow,
            feedwater_temp_c: 227.0,
            tube_wall_temp_c: 310.0,
            heat_transfer_rate_w: config.design_thermal_power_w,
            overall_htc: 0.0,
            heat_flux: 0.0,
        }
    }

    /// Snapshot entries for this state.
    pub fn to_map(&self) -> StateMap {
        let mut map = StateMap::new();
        put(&mut map, "primary_inlet_temp", self.primary_inlet_temp_c);
        put(&mut map, "primary_outlet_temp", self.primary_outlet_temp_c);
        put(&mut map, "secondary_pressure", self.secondary_pressure_mpa);
        put(&mut map, "secondary_temperature", self.secondary_temperature_c);
        put(&mut map, "water_level", self.water_level_m);
        put(&mut map, "steam_quality", self.steam_quality);
        put(&mut map, "steam_void_fraction", self.void_fraction);
        put(&mut map, "steam_flow_rate", self.steam_flow);
        put(&mut map, "feedwater_flow_rate", self.feedwater_flow);
        put(&mut map, "feedwater_temperature", self.feedwater_temp_c);
        put(&mut map, "heat_transfer_rate", self.heat_transfer_rate_w);
        put(&mut map, "tube_wall_temperature", self.tube_wall_temp_c);
        put(&mut map, "overall_htc", self.overall_htc);
        put(&mut map, "heat_flux", self.heat_flux);
        map
    }
}
