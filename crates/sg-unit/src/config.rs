//! Versioned configuration of one steam generator unit.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use sg_fouling::{TspFoulingConfig, TubeInteriorConfig};

/// Configuration layout understood by this crate.
pub const CONFIG_VERSION: u32 = 1;

/// Design parameters of a single U-tube steam generator.
///
/// Every field has a fixed design default; scenario files only need to
/// name the values they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamGeneratorConfig {
    pub version: u32,

    /// Design thermal power (W).
    pub design_thermal_power_w: f64,
    /// Design steam flow (kg/s).
    pub design_steam_flow: f64,
    /// Design feedwater flow (kg/s).
    pub design_feedwater_flow: f64,
    /// Primary design flow through the tube bundle (kg/s).
    pub primary_design_flow: f64,

    /// Heat transfer area (m²).
    pub heat_transfer_area: f64,
    pub tube_count: u32,
    /// Tube inner diameter (m).
    pub tube_inner_diameter_m: f64,
    /// Tube wall thickness (m).
    pub tube_wall_thickness_m: f64,
    /// Tube wall conductivity (W/m/K).
    pub tube_wall_conductivity: f64,

    /// Primary film coefficient at design flow (W/m²/K).
    pub design_primary_htc: f64,
    /// Secondary boiling coefficient at design pressure (W/m²/K).
    pub design_secondary_htc: f64,
    /// Primary film exponent on flow ratio.
    pub primary_flow_exponent: f64,
    /// Secondary film exponent on pressure ratio.
    pub secondary_pressure_exponent: f64,
    /// Primary coolant specific heat (J/kg/K).
    pub primary_cp: f64,

    /// Design secondary pressure (MPa).
    pub design_pressure_mpa: f64,
    /// Secondary water inventory (kg).
    pub secondary_water_mass_kg: f64,
    /// Vessel inner diameter at the water level (m).
    pub vessel_diameter_m: f64,
    /// Design steam quality at the outlet.
    pub design_steam_quality: f64,

    /// Normal water level (m); full area is wetted at or above it.
    pub normal_water_level_m: f64,
    /// Minimum water level (m); area floors below it.
    pub min_water_level_m: f64,
    /// Wetted area fraction at or below the minimum level.
    pub min_area_fraction: f64,

    /// Pressure time constant (s).
    pub pressure_time_constant_s: f64,
    /// Steam quality time constant (s).
    pub quality_time_constant_s: f64,
    /// Longest elapsed time one step may cover (s); longer steps are cut.
    pub max_time_step_s: f64,

    /// Pressure-drop ratio the primary pumps can absorb.
    pub pump_pressure_margin: f64,
    /// Base primary pump power (MW).
    pub base_pump_power_mw: f64,
    /// Tube wall temperature that raises a diagnostic (°C).
    pub tube_wall_temperature_alarm_c: f64,

    pub tsp: TspFoulingConfig,
    pub tube_interior: TubeInteriorConfig,
}

impl Default for SteamGeneratorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            design_thermal_power_w: 1.0e9,
            design_steam_flow: 555.0,
            design_feedwater_flow: 555.0,
            primary_design_flow: 5700.0,
            heat_transfer_area: 5000.0,
            tube_count: 3388,
            tube_inner_diameter_m: 0.0191,
            tube_wall_thickness_m: 0.00109,
            tube_wall_conductivity: 385.0,
            design_primary_htc: 28_000.0,
            design_secondary_htc: 18_000.0,
            primary_flow_exponent: 0.8,
            secondary_pressure_exponent: 0.15,
            primary_cp: 5200.0,
            design_pressure_mpa: 6.895,
            secondary_water_mass_kg: 68_000.0,
            vessel_diameter_m: 4.0,
            design_steam_quality: 0.995,
            normal_water_level_m: 12.5,
            min_water_level_m: 8.0,
            min_area_fraction: 0.1,
            pressure_time_constant_s: 60.0,
            quality_time_constant_s: 30.0,
            max_time_step_s: 86_400.0,
            pump_pressure_margin: 3.0,
            base_pump_power_mw: 5.0,
            tube_wall_temperature_alarm_c: 400.0,
            tsp: TspFoulingConfig::default(),
            tube_interior: TubeInteriorConfig::default(),
        }
    }
}

impl SteamGeneratorConfig {
    /// Check the configuration once, before a unit is built.
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported version, non-positive design
    /// quantities, or inconsistent level and fraction limits.
    pub fn validate(&self) -> SimResult<()> {
        if self.version != CONFIG_VERSION {
            return Err(SimError::UnsupportedVersion {
                found: self.version,
                supported: CONFIG_VERSION,
            });
        }

        let positive = [
            (self.design_thermal_power_w, "design_thermal_power_w"),
            (self.design_steam_flow, "design_steam_flow"),
            (self.design_feedwater_flow, "design_feedwater_flow"),
            (self.primary_design_flow, "primary_design_flow"),
            (self.heat_transfer_area, "heat_transfer_area"),
            (self.tube_inner_diameter_m, "tube_inner_diameter_m"),
            (self.tube_wall_thickness_m, "tube_wall_thickness_m"),
            (self.tube_wall_conductivity, "tube_wall_conductivity"),
            (self.design_primary_htc, "design_primary_htc"),
            (self.design_secondary_htc, "design_secondary_htc"),
            (self.primary_cp, "primary_cp"),
            (self.design_pressure_mpa, "design_pressure_mpa"),
            (self.secondary_water_mass_kg, "secondary_water_mass_kg"),
            (self.vessel_diameter_m, "vessel_diameter_m"),
            (self.pressure_time_constant_s, "pressure_time_constant_s"),
            (self.quality_time_constant_s, "quality_time_constant_s"),
            (self.max_time_step_s, "max_time_step_s"),
            (self.pump_pressure_margin, "pump_pressure_margin"),
        ];
        for (value, what) in positive {
            sg_core::ensure_positive(value, what)?;
        }

        if self.tube_count == 0 {
            return Err(SimError::InvalidArg { what: "tube_count" });
        }
        if !(self.min_water_level_m < self.normal_water_level_m) {
            return Err(SimError::InvalidArg {
                what: "min_water_level_m must be below normal_water_level_m",
            });
        }
        sg_core::ensure_in_range(self.min_area_fraction, 0.0, 1.0, "min_area_fraction")?;
        if self.min_area_fraction <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "min_area_fraction",
            });
        }
        sg_core::ensure_in_range(self.design_steam_quality, 0.9, 1.0, "design_steam_quality")?;
        sg_core::ensure_finite(self.base_pump_power_mw, "base_pump_power_mw")?;
        sg_core::ensure_finite(
            self.tube_wall_temperature_alarm_c,
            "tube_wall_temperature_alarm_c",
        )?;

        self.tsp.validate()?;
        self.tube_interior.validate()?;
        Ok(())
    }

    /// Total primary flow area of the tube bundle (m²).
    pub fn tube_flow_area(&self) -> f64 {
        let r = self.tube_inner_diameter_m / 2.0;
        self.tube_count as f64 * std::f64::consts::PI * r * r
    }

    /// Free surface area of the secondary pool (m²).
    pub fn pool_area(&self) -> f64 {
        let r = self.vessel_diameter_m / 2.0;
        std::f64::consts::PI * r * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        SteamGeneratorConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_unknown_version() {
        let config = SteamGeneratorConfig {
            version: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn rejects_bad_geometry() {
        let config = SteamGeneratorConfig {
            heat_transfer_area: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimError::InvalidArg {
                what: "heat_transfer_area"
            })
        );

        let config = SteamGeneratorConfig {
            tube_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SteamGeneratorConfig {
            min_water_level_m: 13.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nested_fouling_config_is_checked() {
        let mut config = SteamGeneratorConfig::default();
        config.tube_interior.velocity_exponent = 0.6;
        assert!(matches!(config.validate(), Err(SimError::Fouling { .. })));
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config: SteamGeneratorConfig =
            serde_yaml::from_str("version: 1\nheat_transfer_area: 4500.0\n").unwrap();
        assert_eq!(config.heat_transfer_area, 4500.0);
        assert_eq!(config.tube_count, 3388);
        assert_eq!(config.tsp, TspFoulingConfig::default());
    }

    #[test]
    fn derived_areas() {
        let config = SteamGeneratorConfig::default();
        let area = config.tube_flow_area();
        assert!((area - 3388.0 * std::f64::consts::PI * 0.00955 * 0.00955).abs() < 1e-9);
        assert!((config.pool_area() - std::f64::consts::PI * 4.0).abs() < 1e-12);
    }
}
