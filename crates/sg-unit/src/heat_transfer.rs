//! Primary-to-secondary heat transfer.
//!
//! ## Model
//!
//! ```text
//! 1/U_clean = 1/h_p + t_w/k_w + 1/h_s
//! U_tsp     = U_clean · (1 − D_tsp)
//! 1/U       = 1/U_tsp + R_scale
//! Q         = U · A_eff(level) · LMTD,   0 ≤ Q ≤ ṁ·cp·ΔT
//! T_wall    = T_sat + q · (1/h_s + R_tsp + t_w/(2 k_w) + R_scale)
//! ```
//!
//! TSP degradation scales the coefficient while interior scale adds a
//! series resistance. The two channels must stay distinct.

use crate::config::SteamGeneratorConfig;
use crate::properties::saturation_temperature;
use serde::Serialize;
use sg_core::clip;

/// Primary flow below which no heat is transferred (kg/s).
pub const MIN_PRIMARY_FLOW: f64 = 100.0;
/// Primary ΔT below which no heat is transferred (°C).
pub const MIN_PRIMARY_DELTA_T: f64 = 1.0;
/// Primary ΔT below which heat transfer is limited to a tenth of the
/// available primary energy (°C).
pub const REDUCED_PRIMARY_DELTA_T: f64 = 5.0;
/// Heat flux floor used for the wall temperature (W/m²).
pub const MIN_HEAT_FLUX: f64 = 5000.0;
/// Conductivity of mixed TSP crevice deposits (W/m/K).
pub const TSP_DEPOSIT_CONDUCTIVITY: f64 = 3.0;

/// Guard that overrode the raw `U·A·LMTD` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeatTransferGuard {
    LowPrimaryFlow,
    LowPrimaryDeltaT,
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatTransferInputs {
    pub primary_inlet_temp_c: f64,
    pub primary_outlet_temp_c: f64,
    pub primary_flow: f64,
    pub secondary_pressure_mpa: f64,
    pub water_level_m: f64,
    /// TSP heat transfer degradation in [0, 1).
    pub tsp_degradation: f64,
    /// Secondary-side deposit resistance (m²K/W).
    pub tsp_deposit_resistance: f64,
    /// Primary-side scale resistance (m²K/W).
    pub scale_resistance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeatTransferResult {
    /// Heat transfer rate (W).
    pub heat_transfer_rate: f64,
    pub saturation_temp_c: f64,
    pub lmtd: f64,
    pub h_primary: f64,
    pub h_secondary: f64,
    pub flow_factor: f64,
    pub pressure_factor: f64,
    /// Clean coefficient (W/m²/K).
    pub overall_htc: f64,
    /// Coefficient with both fouling channels applied (W/m²/K).
    pub overall_htc_fouled: f64,
    /// Wetted area (m²).
    pub effective_area: f64,
    /// Heat flux used for the wall temperature (W/m²).
    pub heat_flux: f64,
    pub tube_wall_temp_c: f64,
    /// Secondary bulk to tube mid-wall resistance (m²K/W).
    pub wall_path_resistance: f64,
    /// Primary energy available, `ṁ·cp·ΔT` (W).
    pub primary_energy_limit: f64,
    pub guard: Option<HeatTransferGuard>,
}

/// Wetted heat transfer area for a water level (m²).
///
/// Full area at or above the normal level, linear down to the configured
/// floor fraction at the minimum level, and the floor below it.
pub fn effective_area(config: &SteamGeneratorConfig, water_level_m: f64) -> f64 {
    let normal = config.normal_water_level_m;
    let min = config.min_water_level_m;
    let floor = config.min_area_fraction;
    let fraction = if water_level_m >= normal {
        1.0
    } else if water_level_m <= min || water_level_m.is_nan() {
        floor
    } else {
        floor + (1.0 - floor) * (water_level_m - min) / (normal - min)
    };
    config.heat_transfer_area * fraction
}

/// Log-mean temperature difference against a saturated secondary.
///
/// Falls back to the arithmetic mean when the end differences are nearly
/// equal or when either end has no positive driving force; never negative.
pub fn lmtd(dt_hot: f64, dt_cold: f64) -> f64 {
    if dt_hot <= 0.0 || dt_cold <= 0.0 || (dt_hot - dt_cold).abs() < 1.0 {
        return ((dt_hot + dt_cold) / 2.0).max(0.0);
    }
    (dt_hot - dt_cold) / (dt_hot / dt_cold).ln()
}

/// Resistance of TSP deposits on the tube exterior (m²K/W), weighted by
/// the fouled fraction.
pub fn tsp_deposit_resistance(average_thickness_mm: f64, fouling_fraction: f64) -> f64 {
    if average_thickness_mm > 0.0 {
        sg_core::mm_to_m(average_thickness_mm) / TSP_DEPOSIT_CONDUCTIVITY
            * clip(fouling_fraction, 0.0, 1.0)
    } else {
        0.0
    }
}

/// Heat transfer across the tube bundle for one step.
pub fn compute(config: &SteamGeneratorConfig, inputs: &HeatTransferInputs) -> HeatTransferResult {
    let t_in = inputs.primary_inlet_temp_c;
    let t_out = inputs.primary_outlet_temp_c;
    let t_sat = saturation_temperature(inputs.secondary_pressure_mpa);
    let lmtd = lmtd(t_in - t_sat, t_out - t_sat);

    let flow_ratio = (inputs.primary_flow / config.primary_design_flow).max(0.0);
    let flow_factor = flow_ratio.powf(config.primary_flow_exponent);
    let h_primary = (config.design_primary_htc * flow_factor).max(f64::MIN_POSITIVE);
    let pressure_ratio = (inputs.secondary_pressure_mpa / config.design_pressure_mpa).max(0.0);
    let pressure_factor = pressure_ratio.powf(config.secondary_pressure_exponent);
    let h_secondary = (config.design_secondary_htc * pressure_factor).max(f64::MIN_POSITIVE);

    let r_wall = config.tube_wall_thickness_m / config.tube_wall_conductivity;
    let overall_htc = 1.0 / (1.0 / h_primary + r_wall + 1.0 / h_secondary);

    let with_tsp = overall_htc * (1.0 - clip(inputs.tsp_degradation, 0.0, 1.0));
    let scale = inputs.scale_resistance.max(0.0);
    let overall_htc_fouled = if scale > 0.0 && with_tsp > 0.0 {
        1.0 / (1.0 / with_tsp + scale)
    } else {
        with_tsp
    };

    let area = effective_area(config, inputs.water_level_m);
    let mut q = overall_htc_fouled * area * lmtd;

    let delta_t = t_in - t_out;
    let primary_energy_limit = inputs.primary_flow * config.primary_cp * delta_t;
    let mut guard = None;
    if delta_t < MIN_PRIMARY_DELTA_T {
        q = 0.0;
        guard = Some(HeatTransferGuard::LowPrimaryDeltaT);
    } else if delta_t < REDUCED_PRIMARY_DELTA_T {
        q = q.min(primary_energy_limit * 0.1);
        guard = Some(HeatTransferGuard::LowPrimaryDeltaT);
    } else {
        q = q.min(primary_energy_limit);
    }
    if inputs.primary_flow < MIN_PRIMARY_FLOW {
        q = 0.0;
        guard = Some(HeatTransferGuard::LowPrimaryFlow);
    }
    if !q.is_finite() {
        q = 0.0;
        guard = Some(HeatTransferGuard::NonFinite);
    }
    let q = q.max(0.0);

    let heat_flux = (q / config.heat_transfer_area).max(MIN_HEAT_FLUX);
    let wall_path_resistance =
        1.0 / h_secondary + inputs.tsp_deposit_resistance.max(0.0) + r_wall / 2.0 + scale;
    let tube_wall_temp_c = t_sat + heat_flux * wall_path_resistance;

    HeatTransferResult {
        heat_transfer_rate: q,
        saturation_temp_c: t_sat,
        lmtd,
        h_primary,
        h_secondary,
        flow_factor,
        pressure_factor,
        overall_htc,
        overall_htc_fouled,
        effective_area: area,
        heat_flux,
        tube_wall_temp_c,
        wall_path_resistance,
        primary_energy_limit,
        guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn design_inputs() -> HeatTransferInputs {
        HeatTransferInputs {
            primary_inlet_temp_c: 327.0,
            primary_outlet_temp_c: 293.0,
            primary_flow: 5700.0,
            secondary_pressure_mpa: 6.895,
            water_level_m: 12.5,
            tsp_degradation: 0.0,
            tsp_deposit_resistance: 0.0,
            scale_resistance: 0.0,
        }
    }

    #[test]
    fn design_point_is_capped_by_primary_energy() {
        let config = SteamGeneratorConfig::default();
        let r = compute(&config, &design_inputs());
        let cap = 5700.0 * 5200.0 * 34.0;
        assert!((r.heat_transfer_rate - cap).abs() < 1.0);
        assert!((r.heat_transfer_rate - 1.0e9).abs() / 1.0e9 < 0.05);
        assert!((r.flow_factor - 1.0).abs() < 1e-12);
        assert!((r.pressure_factor - 1.0).abs() < 1e-12);
        assert!(r.guard.is_none());
        assert!(r.tube_wall_temp_c > r.saturation_temp_c);
    }

    #[test]
    fn area_follows_level() {
        let config = SteamGeneratorConfig::default();
        assert_eq!(effective_area(&config, 14.0), 5000.0);
        assert_eq!(effective_area(&config, 12.5), 5000.0);
        assert_eq!(effective_area(&config, 8.0), 500.0);
        assert_eq!(effective_area(&config, 2.0), 500.0);
        let mid = effective_area(&config, 10.25);
        assert!((mid - 5000.0 * 0.55).abs() < 1e-9);
    }

    #[test]
    fn lmtd_forms() {
        assert!((lmtd(10.0, 10.5) - 10.25).abs() < 1e-12);
        let l = lmtd(77.65, 43.65);
        assert!(l > 43.65 && l < 77.65);
        assert_eq!(lmtd(-5.0, -10.0), 0.0);
        assert_eq!(lmtd(20.0, -4.0), 8.0);
    }

    #[test]
    fn low_flow_and_delta_t_guards() {
        let config = SteamGeneratorConfig::default();
        let r = compute(
            &config,
            &HeatTransferInputs {
                primary_flow: 50.0,
                ..design_inputs()
            },
        );
        assert_eq!(r.heat_transfer_rate, 0.0);
        assert_eq!(r.guard, Some(HeatTransferGuard::LowPrimaryFlow));

        let r = compute(
            &config,
            &HeatTransferInputs {
                primary_outlet_temp_c: 326.5,
                ..design_inputs()
            },
        );
        assert_eq!(r.heat_transfer_rate, 0.0);
        assert_eq!(r.guard, Some(HeatTransferGuard::LowPrimaryDeltaT));

        let r = compute(
            &config,
            &HeatTransferInputs {
                primary_outlet_temp_c: 324.0,
                ..design_inputs()
            },
        );
        assert!(r.heat_transfer_rate <= 0.1 * 5700.0 * 5200.0 * 3.0 + 1e-6);
        assert!(r.heat_transfer_rate > 0.0);
        assert_eq!(r.heat_flux, MIN_HEAT_FLUX.max(r.heat_transfer_rate / 5000.0));
    }

    #[test]
    fn fouling_channels_combine_differently() {
        let config = SteamGeneratorConfig::default();
        let clean = compute(&config, &design_inputs());

        let tsp = compute(
            &config,
            &HeatTransferInputs {
                tsp_degradation: 0.5,
                ..design_inputs()
            },
        );
        assert!((tsp.overall_htc_fouled - 0.5 * clean.overall_htc).abs() < 1e-9);

        let scale = compute(
            &config,
            &HeatTransferInputs {
                scale_resistance: 1.0e-4,
                ..design_inputs()
            },
        );
        let expected = 1.0 / (1.0 / clean.overall_htc + 1.0e-4);
        assert!((scale.overall_htc_fouled - expected).abs() < 1e-9);
        assert_eq!(scale.overall_htc, clean.overall_htc);
    }

    #[test]
    fn deposit_resistance_scales_with_fraction() {
        assert_eq!(tsp_deposit_resistance(0.0, 0.5), 0.0);
        let r = tsp_deposit_resistance(3.0, 0.6);
        assert!((r - 0.003 / 3.0 * 0.6).abs() < 1e-15);
    }

    proptest! {
        #[test]
        fn energy_never_exceeds_primary_supply(
            t_out in 250.0f64..330.0,
            dt in 0.0f64..60.0,
            flow in 0.0f64..8000.0,
            pressure in 1.0f64..8.0,
            level in 6.0f64..16.0,
            deg in 0.0f64..0.9,
            scale in 0.0f64..0.01,
        ) {
            let config = SteamGeneratorConfig::default();
            let r = compute(&config, &HeatTransferInputs {
                primary_inlet_temp_c: t_out + dt,
                primary_outlet_temp_c: t_out,
                primary_flow: flow,
                secondary_pressure_mpa: pressure,
                water_level_m: level,
                tsp_degradation: deg,
                tsp_deposit_resistance: 0.0,
                scale_resistance: scale,
            });
            prop_assert!(r.heat_transfer_rate >= 0.0);
            prop_assert!(r.heat_transfer_rate <= flow * 5200.0 * dt + 1e-6);
        }

        #[test]
        fn wall_temperature_rises_with_scale(
            flow in 1000.0f64..7000.0,
            level in 8.0f64..14.0,
            r1 in 0.0f64..0.005,
            extra in 1.0e-6f64..0.005,
        ) {
            let config = SteamGeneratorConfig::default();
            let base = HeatTransferInputs { primary_flow: flow, water_level_m: level, ..design_inputs() };
            let thin = compute(&config, &HeatTransferInputs { scale_resistance: r1, ..base });
            let thick = compute(&config, &HeatTransferInputs { scale_resistance: r1 + extra, ..base });
            prop_assert!(thick.tube_wall_temp_c > thin.tube_wall_temp_c);
        }
    }
}
