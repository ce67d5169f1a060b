//! Physics primitives shared by the fouling models.
//!
//! Every factor is dimensionless and multiplies a base deposition rate.
//!
//! ## Model
//!
//! ```text
//! f_T   = exp(-Ea / (R T)) / exp(-Ea / (R T_ref))
//! f_pH  = 1 + 0.5 |pH - pH_opt|
//! f_c   = 1 + c k
//! f_v   = clip((v / v_ref)^n, 0.5, 2.0)
//! ```

use serde::{Deserialize, Serialize};
use sg_core::{GAS_CONSTANT, celsius_to_kelvin, clip, seconds_to_years};

/// Absolute temperature window used by the Arrhenius factor (K).
const MIN_KELVIN: f64 = 200.0;
const MAX_KELVIN: f64 = 1000.0;

/// Arrhenius rate ratio of `temp_c` relative to `reference_temp_c`.
///
/// # Arguments
/// * `temp_c` - Surface temperature (°C)
/// * `activation_energy` - Activation energy (J/mol)
/// * `reference_temp_c` - Temperature at which the factor is 1 (°C)
///
/// # Returns
/// Strictly positive multiplier.
pub fn temperature_factor(temp_c: f64, activation_energy: f64, reference_temp_c: f64) -> f64 {
    let t = clip(celsius_to_kelvin(temp_c), MIN_KELVIN, MAX_KELVIN);
    let t_ref = clip(celsius_to_kelvin(reference_temp_c), MIN_KELVIN, MAX_KELVIN);
    let factor = (-activation_energy / GAS_CONSTANT * (1.0 / t - 1.0 / t_ref)).exp();
    if factor.is_finite() && factor > 0.0 {
        factor
    } else {
        f64::MIN_POSITIVE
    }
}

/// Deposition penalty for operating away from the optimum pH. Always >= 1.
pub fn ph_factor(ph: f64, optimal_ph: f64) -> f64 {
    let deviation = (ph - optimal_ph).abs();
    if deviation.is_finite() {
        1.0 + 0.5 * deviation
    } else {
        1.0
    }
}

pub fn concentration_multiplier(concentration: f64, base_factor: f64) -> f64 {
    1.0 + concentration * base_factor
}

/// Power-law velocity dependence, clipped to [0.5, 2.0].
///
/// A positive exponent models mass-transfer-limited deposition, a negative
/// one models scouring.
pub fn velocity_factor(velocity: f64, reference_velocity: f64, exponent: f64) -> f64 {
    let ratio = if reference_velocity > 0.0 {
        velocity.max(0.0) / reference_velocity
    } else {
        1.0
    };
    clip(ratio.powf(exponent), 0.5, 2.0)
}

/// Operating-time bookkeeping for one fouling model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FoulingClock {
    /// Total operating time (years). Never decreases.
    pub operating_years: f64,
    /// Time since the last successful maintenance (years).
    pub years_since_cleaning: f64,
    /// Successful maintenance calls since construction or reset.
    pub cleaning_cycles: u32,
}

impl FoulingClock {
    /// Advance by `dt_s` seconds and return the increment in years.
    ///
    /// Negative or non-finite steps advance nothing.
    pub fn advance(&mut self, dt_s: f64) -> f64 {
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return 0.0;
        }
        let dt_years = seconds_to_years(dt_s);
        self.operating_years += dt_years;
        self.years_since_cleaning += dt_years;
        dt_years
    }

    pub fn mark_maintained(&mut self) {
        self.cleaning_cycles += 1;
        self.years_since_cleaning = 0.0;
    }
}
