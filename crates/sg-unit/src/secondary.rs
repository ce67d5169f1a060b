//! Secondary-side mass, energy, pressure and level integration.
//!
//! ## Model
//!
//! ```text
//! ṁ_gen = max(0, (Q − ṁ_fw·(h_f − h_fw)) / h_fg),   0 when ṁ_fw < 0.1 kg/s
//! P_eq  = clip(P_d·(0.7 + 0.3·Q/Q_d) − 0.5·ṁ_steam/ṁ_d, 3, 8.5)
//! P'    = P_eq + (P − P_eq)·exp(−dt/τ_p) + corrections
//! L'    = L + (ṁ_fw − ṁ_steam)·dt/(ρ_f·A) + ṁ_gen·dt·(1/ρ_g − 1/ρ_f)/A
//! x'    = x + (x_target − x)·(1 − exp(−dt/τ_x))
//! α     = x·ρ_f / (x·ρ_f + (1 − x)·ρ_g)
//! ```
//!
//! Every result is clipped to its physical range.

use crate::config::SteamGeneratorConfig;
use crate::properties::{
    latent_heat, liquid_density, liquid_enthalpy, saturated_liquid_enthalpy,
    saturation_temperature, vapor_density,
};
use crate::state::limits;
use serde::Serialize;
use sg_core::clip;

/// Feedwater flow below which no steam is generated (kg/s).
pub const MIN_FEEDWATER_FLOW: f64 = 0.1;
/// Steam draw above which an empty feed line depletes inventory (kg/s).
const DEPLETION_STEAM_FLOW: f64 = 100.0;
/// Equilibrium pressure band (MPa).
const EQUILIBRIUM_PRESSURE_RANGE: (f64, f64) = (3.0, 8.5);
/// Limit on the summed pressure corrections per step (MPa).
const MAX_PRESSURE_CORRECTION: f64 = 0.2;
/// Level below which carryover starts to degrade quality (m).
const QUALITY_LEVEL_THRESHOLD: f64 = 11.0;

/// Secondary-side conditions at the start of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryConditions {
    pub pressure_mpa: f64,
    pub water_level_m: f64,
    pub steam_quality: f64,
}

/// Driving terms for one step, with flows already clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryDrive {
    /// Heat input (W).
    pub heat_input_w: f64,
    pub steam_flow: f64,
    pub feedwater_flow: f64,
    pub feedwater_temp_c: f64,
    pub dt_s: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SecondaryDynamics {
    pub pressure_mpa: f64,
    pub water_level_m: f64,
    pub steam_quality: f64,
    pub void_fraction: f64,
    /// Steam generated by boiling (kg/s).
    pub steam_generation_rate: f64,
    pub pressure_change_rate: f64,
    pub level_change_rate: f64,
    /// Net liquid inflow (kg/s).
    pub mass_change_rate: f64,
    pub level_change_mass: f64,
    pub level_change_swell: f64,
    pub target_quality: f64,
    pub quality_degradation: f64,
    pub supply_demand_imbalance: f64,
    /// Net energy into the secondary (kW).
    pub energy_balance_kw: f64,
}

/// Advance the secondary side by `drive.dt_s`.
pub fn integrate(
    config: &SteamGeneratorConfig,
    start: &SecondaryConditions,
    drive: &SecondaryDrive,
) -> SecondaryDynamics {
    let p = start.pressure_mpa;
    let dt = drive.dt_s;
    let t_sat = saturation_temperature(p);
    let h_f = saturated_liquid_enthalpy(t_sat);
    let h_fg = latent_heat(t_sat);
    let h_fw = liquid_enthalpy(drive.feedwater_temp_c, p);
    let rho_f = liquid_density(t_sat, p);
    let rho_g = vapor_density(t_sat, p).max(f64::MIN_POSITIVE);

    let heat_kw = drive.heat_input_w / 1000.0;
    let mass_change_rate = drive.feedwater_flow - drive.steam_flow;

    let steam_generation_rate = if drive.feedwater_flow < MIN_FEEDWATER_FLOW || h_fg <= 0.0 {
        0.0
    } else {
        ((heat_kw - drive.feedwater_flow * (h_f - h_fw)) / h_fg).max(0.0)
    };

    // Pressure
    let (p_lo, p_hi) = EQUILIBRIUM_PRESSURE_RANGE;
    let heat_factor = drive.heat_input_w / config.design_thermal_power_w;
    let demand_factor = drive.steam_flow / config.design_steam_flow;
    let p_eq = clip(config.design_pressure_mpa * (0.7 + 0.3 * heat_factor), p_lo, p_hi);
    let p_eq = clip(p_eq - 0.5 * demand_factor, p_lo, p_hi);
    let decay = (-dt / config.pressure_time_constant_s).exp();
    let relaxed = p_eq + (p - p_eq) * decay;

    let mut correction = 0.0;
    if drive.feedwater_flow < MIN_FEEDWATER_FLOW && drive.steam_flow > DEPLETION_STEAM_FLOW {
        correction -= drive.steam_flow / config.secondary_water_mass_kg * p * 2.0 * dt;
    }
    let supply_demand_imbalance = steam_generation_rate / config.design_steam_flow - demand_factor;
    correction += supply_demand_imbalance * 0.005 * dt;
    let correction = clip(correction, -MAX_PRESSURE_CORRECTION, MAX_PRESSURE_CORRECTION);
    let pressure = clip(
        relaxed + correction,
        limits::MIN_PRESSURE_MPA,
        limits::MAX_PRESSURE_MPA,
    );

    // Level
    let pool = config.pool_area();
    let level_change_mass = mass_change_rate * dt / (rho_f * pool);
    let level_change_swell = steam_generation_rate * dt * (1.0 / rho_g - 1.0 / rho_f) / pool;
    let level_change = level_change_mass + level_change_swell;
    let water_level = clip(
        start.water_level_m + level_change,
        limits::MIN_LEVEL_M,
        limits::MAX_LEVEL_M,
    );

    // Quality
    let mut quality_degradation = 0.0;
    if water_level < QUALITY_LEVEL_THRESHOLD {
        quality_degradation += (QUALITY_LEVEL_THRESHOLD - water_level) / 3.0 * 0.02;
    }
    if demand_factor > 1.1 {
        quality_degradation += ((demand_factor - 1.1) * 0.01).min(0.03);
    }
    let flux_ratio = heat_factor;
    if flux_ratio > 1.2 {
        quality_degradation += ((flux_ratio - 1.2) * 0.005).min(0.02);
    }
    let target_quality = clip(
        config.design_steam_quality - quality_degradation,
        limits::MIN_QUALITY,
        limits::MAX_QUALITY,
    );
    let alpha = 1.0 - (-dt / config.quality_time_constant_s).exp();
    let steam_quality = clip(
        start.steam_quality + (target_quality - start.steam_quality) * alpha,
        limits::MIN_QUALITY,
        limits::MAX_QUALITY,
    );

    let void_fraction = clip(
        steam_quality * rho_f / (steam_quality * rho_f + (1.0 - steam_quality) * rho_g),
        0.0,
        limits::MAX_VOID_FRACTION,
    );

    let h_g = h_f + h_fg;
    let energy_balance_kw = drive.feedwater_flow * h_fw + heat_kw - drive.steam_flow * h_g;

    SecondaryDynamics {
        pressure_mpa: pressure,
        water_level_m: water_level,
        steam_quality,
        void_fraction,
        steam_generation_rate,
        pressure_change_rate: (pressure - p) / dt,
        level_change_rate: level_change / dt,
        mass_change_rate,
        level_change_mass,
        level_change_swell,
        target_quality,
        quality_degradation,
        supply_demand_imbalance,
        energy_balance_kw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn design_start() -> SecondaryConditions {
        SecondaryConditions {
            pressure_mpa: 6.895,
            water_level_m: 12.5,
            steam_quality: 0.99,
        }
    }

    fn design_drive() -> SecondaryDrive {
        SecondaryDrive {
            heat_input_w: 1.0e9,
            steam_flow: 555.0,
            feedwater_flow: 555.0,
            feedwater_temp_c: 227.0,
            dt_s: 1.0,
        }
    }

    #[test]
    fn no_feedwater_no_steam() {
        let config = SteamGeneratorConfig::default();
        let out = integrate(
            &config,
            &design_start(),
            &SecondaryDrive {
                feedwater_flow: 0.0,
                ..design_drive()
            },
        );
        assert_eq!(out.steam_generation_rate, 0.0);
        assert_eq!(out.level_change_swell, 0.0);
        assert!(out.water_level_m < 12.5);
        assert!((12.5 - out.water_level_m - 0.0477).abs() < 0.002);
    }

    #[test]
    fn design_step_generates_steam() {
        let config = SteamGeneratorConfig::default();
        let out = integrate(&config, &design_start(), &design_drive());
        assert!(out.steam_generation_rate > 400.0 && out.steam_generation_rate < 800.0);
        assert!(out.level_change_swell > 0.0);
        assert!(out.target_quality == 0.995);
        assert!(out.steam_quality > 0.99 && out.steam_quality < 0.995);
    }

    #[test]
    fn pressure_relaxes_without_overshoot_for_large_steps() {
        let config = SteamGeneratorConfig::default();
        let drive = SecondaryDrive {
            dt_s: 1.0e6,
            steam_flow: 0.0,
            feedwater_flow: 0.0,
            heat_input_w: 0.0,
            ..design_drive()
        };
        let out = integrate(&config, &design_start(), &drive);
        assert!((out.pressure_mpa - 0.7 * 6.895).abs() < 1e-9);
    }

    #[test]
    fn low_level_degrades_target_quality() {
        let config = SteamGeneratorConfig::default();
        let start = SecondaryConditions {
            water_level_m: 8.0,
            ..design_start()
        };
        let out = integrate(
            &config,
            &start,
            &SecondaryDrive {
                feedwater_flow: 0.0,
                ..design_drive()
            },
        );
        assert!((out.quality_degradation - 0.02).abs() < 1e-12);
        assert!((out.target_quality - 0.975).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn results_stay_in_bounds(
            p in 1.0f64..8.0,
            level in 8.0f64..16.0,
            x in 0.9f64..1.0,
            q in 0.0f64..5.0e9,
            steam in 0.0f64..2000.0,
            fw in 0.0f64..2000.0,
            t_fw in 20.0f64..300.0,
            dt in 1.0e-3f64..1.0e5,
        ) {
            let config = SteamGeneratorConfig::default();
            let out = integrate(
                &config,
                &SecondaryConditions { pressure_mpa: p, water_level_m: level, steam_quality: x },
                &SecondaryDrive {
                    heat_input_w: q,
                    steam_flow: steam,
                    feedwater_flow: fw,
                    feedwater_temp_c: t_fw,
                    dt_s: dt,
                },
            );
            prop_assert!((1.0..=8.0).contains(&out.pressure_mpa));
            prop_assert!((8.0..=16.0).contains(&out.water_level_m));
            prop_assert!((0.9..=1.0).contains(&out.steam_quality));
            prop_assert!((0.0..=0.8).contains(&out.void_fraction));
            prop_assert!(out.steam_generation_rate >= 0.0);
            if fw < MIN_FEEDWATER_FLOW {
                prop_assert_eq!(out.steam_generation_rate, 0.0);
            }
        }
    }
}
