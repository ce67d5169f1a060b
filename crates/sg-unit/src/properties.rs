//! Closed-form water and steam properties.
//!
//! These are deliberately simple fits, adequate for PWR secondary-side
//! conditions (roughly 1-8 MPa). Temperatures in °C, pressures in MPa,
//! enthalpies in kJ/kg, densities in kg/m³.

use sg_core::{celsius_to_kelvin, clip, mpa_to_bar, mpa_to_pa};

/// Specific heat used for liquid enthalpy (kJ/kg/K).
const CP_LIQUID: f64 = 4.18;
/// Latent heat at 0 °C (kJ/kg).
const LATENT_HEAT_REF: f64 = 2257.0;
/// Critical temperature used by the latent-heat fit (°C).
const CRITICAL_TEMPERATURE: f64 = 374.0;
/// Specific gas constant of steam (J/kg/K).
const R_STEAM: f64 = 461.5;

/// Saturation temperature (°C) from a cubic fit in ln(P[bar]).
pub fn saturation_temperature(pressure_mpa: f64) -> f64 {
    if !(pressure_mpa > 0.001) {
        return 10.0;
    }
    let ln_p = mpa_to_bar(pressure_mpa).ln();
    let t = 42.6776 + 34.5194 * ln_p + 2.8896 * ln_p.powi(2) + 0.1153 * ln_p.powi(3);
    clip(t, 10.0, CRITICAL_TEMPERATURE)
}

pub fn saturated_liquid_enthalpy(temperature_c: f64) -> f64 {
    CP_LIQUID * temperature_c
}

/// Latent heat of vaporization (kJ/kg); vanishes at the critical point.
pub fn latent_heat(temperature_c: f64) -> f64 {
    let reduced = clip(1.0 - temperature_c / CRITICAL_TEMPERATURE, 0.0, 1.0);
    LATENT_HEAT_REF * reduced.powf(0.38)
}

/// Compressed-liquid enthalpy of feedwater (kJ/kg).
pub fn liquid_enthalpy(temperature_c: f64, pressure_mpa: f64) -> f64 {
    CP_LIQUID * temperature_c + 0.001 * (pressure_mpa - 0.1) * temperature_c
}

pub fn liquid_density(temperature_c: f64, pressure_mpa: f64) -> f64 {
    let thermal = 1000.0 * (1.0 - 0.0003 * temperature_c);
    thermal * (1.0 + 4.5e-10 * mpa_to_pa(pressure_mpa))
}

/// Ideal-gas steam density.
pub fn vapor_density(temperature_c: f64, pressure_mpa: f64) -> f64 {
    mpa_to_pa(pressure_mpa) / (R_STEAM * celsius_to_kelvin(temperature_c))
}
