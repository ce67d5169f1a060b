//! Tube support plate (TSP) crevice fouling.
//!
//! Secondary-side deposits collect in the flow holes of each support plate.
//! Four species are tracked per plate level; lower plates foul faster.
//!
//! ## Model
//!
//! ```text
//! rate_s  = base_s · f_c · f_T · f_pH · f_v             (mg/cm²/yr)
//! dδ_s/dt = rate_s / 1000 / ρ_s · 10 · level_factor     (mm/yr)
//! f       = min(mean_level_thickness / δ_max, 1)
//! degr    = min((f^1.5 + 0.3 f) · 0.6, 0.9)
//! ΔP/ΔP0  = (1 / max(1 - f, 0.1))^2
//! cap     = 1 / sqrt(ΔP/ΔP0)
//! ```
//!
//! Copper deposition does not depend on pH and silica does not depend on
//! velocity. Biological growth is suppressed above 60 °C.

use crate::error::{FoulingError, FoulingResult};
use crate::kernel::{
    FoulingClock, concentration_multiplier, ph_factor, temperature_factor, velocity_factor,
};
use crate::maintenance::{
    CleaningMethod, MaintenanceArgs, MaintenanceHistory, MaintenanceResult, RadiationExposure,
};
use crate::model::FoulingModel;
use serde::{Deserialize, Serialize};
use sg_chemistry::{ChemistryProvider, ChemistryState, keys};
use sg_core::{
    StateMap, clip, ensure_in_range, ensure_positive, finite_or, flag, put, seconds_to_hours,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Maintenance actions understood by [`TspFoulingModel`].
pub const TSP_ACTIONS: &[&str] = &[
    "chemical_cleaning",
    "mechanical_cleaning",
    "secondary_side_cleaning",
    "tsp_inspection",
    "tsp_flow_test",
];

const SPECIES_COUNT: usize = 4;

/// Deposit species tracked on each plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositSpecies {
    Magnetite,
    Copper,
    Silica,
    Biological,
}

impl DepositSpecies {
    pub const ALL: [DepositSpecies; SPECIES_COUNT] = [
        DepositSpecies::Magnetite,
        DepositSpecies::Copper,
        DepositSpecies::Silica,
        DepositSpecies::Biological,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DepositSpecies::Magnetite => "magnetite",
            DepositSpecies::Copper => "copper",
            DepositSpecies::Silica => "silica",
            DepositSpecies::Biological => "biological",
        }
    }

    /// Deposit density (g/cm³).
    pub fn density(self) -> f64 {
        match self {
            DepositSpecies::Magnetite => 5.2,
            DepositSpecies::Copper => 8.9,
            DepositSpecies::Silica => 2.2,
            DepositSpecies::Biological => 1.2,
        }
    }

    /// Share of the per-hole growth limit this species may occupy.
    fn cap_share(self) -> f64 {
        match self {
            DepositSpecies::Magnetite => 0.4,
            DepositSpecies::Copper => 0.2,
            DepositSpecies::Silica => 0.3,
            DepositSpecies::Biological => 0.1,
        }
    }

    /// Split of a seeded initial deposit.
    fn seed_share(self) -> f64 {
        match self {
            DepositSpecies::Magnetite => 0.5,
            DepositSpecies::Copper => 0.15,
            DepositSpecies::Silica => 0.25,
            DepositSpecies::Biological => 0.1,
        }
    }
}

/// Secondary chemistry used when the provider omits a species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryChemistryDefaults {
    pub ph: f64,
    pub iron_ppm: f64,
    pub copper_ppm: f64,
    pub silica_ppm: f64,
    pub dissolved_oxygen_ppm: f64,
}

impl Default for SecondaryChemistryDefaults {
    fn default() -> Self {
        Self {
            ph: 9.2,
            iron_ppm: 0.1,
            copper_ppm: 0.05,
            silica_ppm: 20.0,
            dissolved_oxygen_ppm: 0.005,
        }
    }
}

/// Configuration for TSP fouling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TspFoulingConfig {
    pub tsp_count: usize,
    /// Flow hole diameter (m).
    pub hole_diameter_m: f64,

    /// Base deposition rates (mg/cm²/yr).
    pub base_magnetite_rate: f64,
    pub base_copper_rate: f64,
    pub base_silica_rate: f64,
    pub base_biological_rate: f64,

    pub iron_concentration_factor: f64,
    pub copper_concentration_factor: f64,
    pub silica_concentration_factor: f64,
    pub oxygen_concentration_factor: f64,

    pub ph_optimal: f64,
    /// Arrhenius activation energy (J/mol).
    pub activation_energy: f64,
    pub reference_temperature_c: f64,
    pub reference_velocity: f64,
    pub velocity_exponent: f64,
    /// Temperature above which biological growth dies off (°C).
    pub biological_onset_c: f64,
    pub biological_decay_c: f64,
    /// Extra growth on the lowest plate relative to the top plate.
    pub level_variation: f64,

    /// Mean deposit thickness at which fouling fraction reaches 1 (mm).
    pub max_fouling_thickness_mm: f64,
    pub flow_restriction_exponent: f64,
    pub heat_transfer_degradation_factor: f64,
    pub mixing_degradation_exponent: f64,
    pub max_heat_transfer_degradation: f64,
    /// Smallest open-area fraction used in the pressure-drop law.
    pub min_open_fraction: f64,

    pub chemical_cleaning_effectiveness: f64,
    pub mechanical_cleaning_effectiveness: f64,
    pub secondary_side_cleaning_effectiveness: f64,

    pub design_life_years: f64,
    pub replacement_threshold: f64,
    pub shutdown_fouling_threshold: f64,
    pub shutdown_heat_transfer_degradation: f64,
    pub shutdown_pressure_drop_ratio: f64,
    pub shutdown_maldistribution: f64,

    pub chemistry_defaults: SecondaryChemistryDefaults,
}

impl Default for TspFoulingConfig {
    fn default() -> Self {
        Self {
            tsp_count: 7,
            hole_diameter_m: 0.023,
            base_magnetite_rate: 2.5,
            base_copper_rate: 0.8,
            base_silica_rate: 1.2,
            base_biological_rate: 0.5,
            iron_concentration_factor: 1.5,
            copper_concentration_factor: 2.0,
            silica_concentration_factor: 1.8,
            oxygen_concentration_factor: 10.0,
            ph_optimal: 9.2,
            activation_energy: 45_000.0,
            reference_temperature_c: 300.0,
            reference_velocity: 3.0,
            velocity_exponent: 0.5,
            biological_onset_c: 60.0,
            biological_decay_c: 20.0,
            level_variation: 0.3,
            max_fouling_thickness_mm: 5.0,
            flow_restriction_exponent: 2.0,
            heat_transfer_degradation_factor: 0.6,
            mixing_degradation_exponent: 1.5,
            max_heat_transfer_degradation: 0.9,
            min_open_fraction: 0.1,
            chemical_cleaning_effectiveness: 0.75,
            mechanical_cleaning_effectiveness: 0.85,
            secondary_side_cleaning_effectiveness: 0.3,
            design_life_years: 40.0,
            replacement_threshold: 0.80,
            shutdown_fouling_threshold: 0.85,
            shutdown_heat_transfer_degradation: 0.4,
            shutdown_pressure_drop_ratio: 5.0,
            shutdown_maldistribution: 0.3,
            chemistry_defaults: SecondaryChemistryDefaults::default(),
        }
    }
}

impl TspFoulingConfig {
    pub fn validate(&self) -> FoulingResult<()> {
        if self.tsp_count == 0 {
            return Err(FoulingError::InvalidArg {
                what: "tsp_count must be at least 1",
            });
        }
        ensure_positive(self.hole_diameter_m, "hole_diameter_m")?;
        ensure_positive(self.max_fouling_thickness_mm, "max_fouling_thickness_mm")?;
        ensure_positive(self.reference_velocity, "reference_velocity")?;
        ensure_positive(self.flow_restriction_exponent, "flow_restriction_exponent")?;
        ensure_positive(self.mixing_degradation_exponent, "mixing_degradation_exponent")?;
        ensure_positive(self.biological_decay_c, "biological_decay_c")?;
        ensure_in_range(self.min_open_fraction, 1e-3, 1.0, "min_open_fraction")?;
        ensure_in_range(
            self.max_heat_transfer_degradation,
            0.0,
            0.99,
            "max_heat_transfer_degradation",
        )?;
        for (value, what) in [
            (self.chemical_cleaning_effectiveness, "chemical_cleaning_effectiveness"),
            (self.mechanical_cleaning_effectiveness, "mechanical_cleaning_effectiveness"),
            (
                self.secondary_side_cleaning_effectiveness,
                "secondary_side_cleaning_effectiveness",
            ),
            (self.replacement_threshold, "replacement_threshold"),
            (self.shutdown_fouling_threshold, "shutdown_fouling_threshold"),
        ] {
            ensure_in_range(value, 0.0, 1.0, what)?;
        }
        for (value, what) in [
            (self.base_magnetite_rate, "base_magnetite_rate"),
            (self.base_copper_rate, "base_copper_rate"),
            (self.base_silica_rate, "base_silica_rate"),
            (self.base_biological_rate, "base_biological_rate"),
        ] {
            ensure_in_range(value, 0.0, f64::MAX, what)?;
        }
        Ok(())
    }
}

/// Severity band of the current fouling fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulingStage {
    #[default]
    Normal,
    Significant,
    Severe,
    Critical,
}

impl FoulingStage {
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction < 0.4 {
            FoulingStage::Normal
        } else if fraction < 0.7 {
            FoulingStage::Significant
        } else if fraction < 0.85 {
            FoulingStage::Severe
        } else {
            FoulingStage::Critical
        }
    }

    pub fn code(self) -> f64 {
        self as u8 as f64
    }
}

/// First trip condition met by the current fouling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownReason {
    ExcessiveFouling,
    HeatTransferDegradation,
    PressureDrop,
    FlowMaldistribution,
}

impl ShutdownReason {
    pub fn code(self) -> f64 {
        match self {
            ShutdownReason::ExcessiveFouling => 1.0,
            ShutdownReason::HeatTransferDegradation => 2.0,
            ShutdownReason::PressureDrop => 3.0,
            ShutdownReason::FlowMaldistribution => 4.0,
        }
    }
}

/// Derived TSP outputs, recomputed after every change to the deposits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TspOutputs {
    pub fouling_fraction: f64,
    pub average_thickness_mm: f64,
    pub max_thickness_mm: f64,
    pub heat_transfer_degradation: f64,
    pub pressure_drop_ratio: f64,
    /// Achievable fraction of design secondary flow, in (0, 1].
    pub flow_capacity: f64,
    pub flow_maldistribution: f64,
    pub stage: FoulingStage,
    pub shutdown: Option<ShutdownReason>,
    pub replacement_recommended: bool,
    /// Plate-averaged growth rate from the last update (mm/yr).
    pub growth_rate_mm_per_year: f64,
}

impl Default for TspOutputs {
    fn default() -> Self {
        Self {
            fouling_fraction: 0.0,
            average_thickness_mm: 0.0,
            max_thickness_mm: 0.0,
            heat_transfer_degradation: 0.0,
            pressure_drop_ratio: 1.0,
            flow_capacity: 1.0,
            flow_maldistribution: 0.0,
            stage: FoulingStage::Normal,
            shutdown: None,
            replacement_recommended: false,
            growth_rate_mm_per_year: 0.0,
        }
    }
}

/// TSP fouling model for one steam generator.
#[derive(Debug, Clone)]
pub struct TspFoulingModel {
    config: TspFoulingConfig,
    chemistry: Arc<dyn ChemistryProvider>,
    /// Deposit thickness per plate level and species (mm).
    deposits: Vec<[f64; SPECIES_COUNT]>,
    outputs: TspOutputs,
    cumulative_power_loss_mwh: f64,
    clock: FoulingClock,
    history: MaintenanceHistory,
}

impl TspFoulingModel {
    /// Create a clean model.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation.
    pub fn new(
        config: TspFoulingConfig,
        chemistry: Arc<dyn ChemistryProvider>,
    ) -> FoulingResult<Self> {
        config.validate()?;
        let deposits = vec![[0.0; SPECIES_COUNT]; config.tsp_count];
        Ok(Self {
            config,
            chemistry,
            deposits,
            outputs: TspOutputs::default(),
            cumulative_power_loss_mwh: 0.0,
            clock: FoulingClock::default(),
            history: MaintenanceHistory::default(),
        })
    }

    pub fn config(&self) -> &TspFoulingConfig {
        &self.config
    }

    pub fn outputs(&self) -> &TspOutputs {
        &self.outputs
    }

    pub fn heat_transfer_degradation(&self) -> f64 {
        self.outputs.heat_transfer_degradation
    }

    pub fn pressure_drop_ratio(&self) -> f64 {
        self.outputs.pressure_drop_ratio
    }

    /// Fraction of design secondary flow the fouled plates still pass.
    pub fn flow_capacity(&self) -> f64 {
        self.outputs.flow_capacity
    }

    pub fn cumulative_power_loss_mwh(&self) -> f64 {
        self.cumulative_power_loss_mwh
    }

    /// Total deposit on one plate level (mm), `None` past the last plate.
    pub fn level_thickness_mm(&self, level: usize) -> Option<f64> {
        self.deposits.get(level).map(|row| row.iter().sum())
    }

    /// Plate-averaged thickness of one species (mm).
    pub fn species_thickness_mm(&self, species: DepositSpecies) -> f64 {
        let i = species.index();
        self.deposits.iter().map(|row| row[i]).sum::<f64>() / self.deposits.len() as f64
    }

    /// Growth rate of each species before level weighting (mm/yr).
    pub fn species_growth_rates(
        &self,
        temperature_c: f64,
        velocity: f64,
        chemistry: &ChemistryState,
    ) -> [f64; SPECIES_COUNT] {
        let c = &self.config;
        let d = &c.chemistry_defaults;
        let iron = chemistry.get_or(keys::IRON, d.iron_ppm).max(0.0);
        let copper = chemistry.get_or(keys::COPPER, d.copper_ppm).max(0.0);
        let silica = chemistry.get_or(keys::SILICA, d.silica_ppm).max(0.0);
        let oxygen = chemistry
            .get_or(keys::DISSOLVED_OXYGEN, d.dissolved_oxygen_ppm)
            .max(0.0);
        let ph = chemistry.get_or(keys::PH, d.ph);

        let f_t = temperature_factor(temperature_c, c.activation_energy, c.reference_temperature_c);
        let f_ph = ph_factor(ph, c.ph_optimal);
        let f_v = velocity_factor(velocity, c.reference_velocity, c.velocity_exponent);
        let f_bio = if temperature_c < c.biological_onset_c {
            1.0
        } else {
            (-(temperature_c - c.biological_onset_c) / c.biological_decay_c).exp()
        };

        // mg/cm²/yr
        let rates = [
            c.base_magnetite_rate
                * concentration_multiplier(iron, c.iron_concentration_factor)
                * f_t
                * f_ph
                * f_v,
            c.base_copper_rate
                * concentration_multiplier(copper, c.copper_concentration_factor)
                * f_t
                * f_v,
            c.base_silica_rate
                * concentration_multiplier(silica / 100.0, c.silica_concentration_factor)
                * f_t
                * f_ph,
            c.base_biological_rate
                * concentration_multiplier(oxygen, c.oxygen_concentration_factor)
                * f_bio
                * f_v,
        ];

        let mut out = [0.0; SPECIES_COUNT];
        for species in DepositSpecies::ALL {
            let i = species.index();
            let mm_per_year = rates[i] / 1000.0 / species.density() * 10.0;
            out[i] = finite_or(mm_per_year, 0.0).max(0.0);
        }
        out
    }

    /// Lower plates see more deposition; the top plate has factor 1.
    fn level_factor(&self, level: usize) -> f64 {
        let n = self.deposits.len();
        if n <= 1 {
            return 1.0;
        }
        1.0 + self.config.level_variation * (n - level - 1) as f64 / (n - 1) as f64
    }

    /// Growth limit per species on one plate (mm).
    fn species_cap_mm(&self, species: DepositSpecies) -> f64 {
        let hole_radius_mm = self.config.hole_diameter_m * 1000.0 / 2.0;
        hole_radius_mm * 0.9 * species.cap_share()
    }

    /// Advance deposits by `dt_s` seconds at the given secondary conditions.
    ///
    /// # Arguments
    /// * `temperature_c` - Secondary-side temperature (°C)
    /// * `velocity` - Average flow velocity (m/s)
    /// * `dt_s` - Elapsed time (s)
    pub fn update(&mut self, temperature_c: f64, velocity: f64, dt_s: f64) -> TspOutputs {
        let dt_years = self.clock.advance(dt_s);
        let chemistry = self.chemistry.chemistry_state();
        let rates = self.species_growth_rates(temperature_c, velocity, &chemistry);

        let mut weighted_rate = 0.0;
        for level in 0..self.deposits.len() {
            let lf = self.level_factor(level);
            for species in DepositSpecies::ALL {
                let i = species.index();
                let cap = self.species_cap_mm(species);
                let current = self.deposits[level][i];
                let grown = (current + rates[i] * lf * dt_years).min(cap);
                self.deposits[level][i] = grown.max(current);
                weighted_rate += rates[i] * lf;
            }
        }
        let growth_rate = weighted_rate / self.deposits.len() as f64;

        let was_shutdown = self.outputs.shutdown;
        let was_replacement = self.outputs.replacement_recommended;
        self.recompute();
        self.outputs.growth_rate_mm_per_year = growth_rate;

        if dt_years > 0.0 {
            let dt_hours = seconds_to_hours(dt_s);
            let total = self.cumulative_power_loss_mwh
                + 100.0 * self.outputs.heat_transfer_degradation * dt_hours / 1000.0;
            self.cumulative_power_loss_mwh = finite_or(total, self.cumulative_power_loss_mwh);
        }

        if let (None, Some(reason)) = (was_shutdown, self.outputs.shutdown) {
            warn!(
                ?reason,
                fouling_fraction = self.outputs.fouling_fraction,
                "TSP fouling reached a shutdown condition"
            );
        }
        if !was_replacement && self.outputs.replacement_recommended {
            warn!(
                fouling_fraction = self.outputs.fouling_fraction,
                operating_years = self.clock.operating_years,
                "TSP replacement recommended"
            );
        }
        self.outputs
    }

    /// Establish a uniform initial deposit of `thickness_mm` on every plate.
    pub fn seed_deposits(&mut self, thickness_mm: f64) {
        let thickness = finite_or(thickness_mm, 0.0).max(0.0);
        for level in 0..self.deposits.len() {
            for species in DepositSpecies::ALL {
                let cap = self.species_cap_mm(species);
                self.deposits[level][species.index()] = (thickness * species.seed_share()).min(cap);
            }
        }
        self.recompute();
    }

    /// Remove `effectiveness` of every deposit proportionally.
    ///
    /// Returns the drop in fouling fraction.
    pub fn remove_deposits(&mut self, effectiveness: f64) -> f64 {
        let keep = 1.0 - clip(effectiveness, 0.0, 1.0);
        let before = self.outputs.fouling_fraction;
        for row in &mut self.deposits {
            for value in row.iter_mut() {
                *value *= keep;
            }
        }
        self.recompute();
        before - self.outputs.fouling_fraction
    }

    fn recompute(&mut self) {
        let c = &self.config;
        let levels: Vec<f64> = self.deposits.iter().map(|row| row.iter().sum()).collect();
        let n = levels.len() as f64;
        let average = levels.iter().sum::<f64>() / n;
        let max = levels.iter().copied().fold(0.0, f64::max);

        let f = clip(average / c.max_fouling_thickness_mm, 0.0, 1.0);
        let degradation = ((f.powf(c.mixing_degradation_exponent) + 0.3 * f)
            * c.heat_transfer_degradation_factor)
            .min(c.max_heat_transfer_degradation);
        let open = (1.0 - f).max(c.min_open_fraction);
        let pressure_drop_ratio = (1.0 / open).powf(c.flow_restriction_exponent);
        let flow_capacity = clip(1.0 / pressure_drop_ratio.sqrt(), c.min_open_fraction, 1.0);

        let restrictions: Vec<f64> = levels
            .iter()
            .map(|t| clip(t / c.max_fouling_thickness_mm, 0.0, 1.0))
            .collect();
        let mean = restrictions.iter().sum::<f64>() / n;
        let maldistribution = if mean > 0.0 {
            let var = restrictions.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
            (var.sqrt() / (mean + 0.01)).min(1.0)
        } else {
            0.0
        };

        let shutdown = if f >= c.shutdown_fouling_threshold {
            Some(ShutdownReason::ExcessiveFouling)
        } else if degradation >= c.shutdown_heat_transfer_degradation {
            Some(ShutdownReason::HeatTransferDegradation)
        } else if pressure_drop_ratio >= c.shutdown_pressure_drop_ratio {
            Some(ShutdownReason::PressureDrop)
        } else if maldistribution >= c.shutdown_maldistribution {
            Some(ShutdownReason::FlowMaldistribution)
        } else {
            None
        };

        self.outputs = TspOutputs {
            fouling_fraction: f,
            average_thickness_mm: average,
            max_thickness_mm: max,
            heat_transfer_degradation: degradation,
            pressure_drop_ratio,
            flow_capacity,
            flow_maldistribution: maldistribution,
            stage: FoulingStage::from_fraction(f),
            shutdown,
            replacement_recommended: f >= c.replacement_threshold
                || self.clock.operating_years > c.design_life_years,
            growth_rate_mm_per_year: self.outputs.growth_rate_mm_per_year,
        };
    }

    fn cleaning(&mut self, mechanical: bool) -> MaintenanceResult {
        let (effectiveness, duration, next_due, score_gain, label, parts): (
            f64,
            f64,
            f64,
            f64,
            &str,
            &[&str],
        ) = if mechanical {
            (
                self.config.mechanical_cleaning_effectiveness,
                16.0,
                17_520.0,
                1.5,
                "mechanical",
                &["Water lancing equipment", "Sludge removal system"],
            )
        } else {
            (
                self.config.chemical_cleaning_effectiveness,
                12.0,
                8_760.0,
                2.0,
                "chemical",
                &["Chemical cleaning solution", "Corrosion inhibitor"],
            )
        };

        let before = self.outputs.fouling_fraction;
        let thickness_before = self.outputs.average_thickness_mm;
        let reduction = self.remove_deposits(effectiveness);
        let after = self.outputs.fouling_fraction;

        MaintenanceResult::completed(
            format!("TSP {label} cleaning"),
            duration,
            reduction * score_gain,
            next_due,
        )
        .with_findings(format!(
            "Removed {:.0}% of TSP deposits; fouling fraction {before:.3} -> {after:.3}",
            effectiveness * 100.0
        ))
        .with_parts(parts)
        .with_radiation(RadiationExposure::Low)
        .measure("fouling_reduction", reduction)
        .measure(
            "thickness_removed_mm",
            thickness_before - self.outputs.average_thickness_mm,
        )
        .measure("fouling_fraction_after", after)
    }

    fn secondary_side_cleaning(&mut self) -> MaintenanceResult {
        let effectiveness = self.config.secondary_side_cleaning_effectiveness;
        let reduction = self.remove_deposits(effectiveness);
        MaintenanceResult::completed("Secondary side sludge lancing", 8.0, 0.7, 4_380.0)
            .with_findings(format!(
                "Removed {:.0}% of secondary-side deposits",
                effectiveness * 100.0
            ))
            .with_parts(&["Sludge lancing equipment"])
            .with_radiation(RadiationExposure::Low)
            .measure("fouling_reduction", reduction)
    }

    fn inspection(&self) -> MaintenanceResult {
        let o = self.outputs;
        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        match o.stage {
            FoulingStage::Normal => {}
            FoulingStage::Significant => {
                findings.push(format!("Significant TSP fouling: {:.2}", o.fouling_fraction));
                recommendations.push("Schedule chemical cleaning".to_string());
            }
            FoulingStage::Severe | FoulingStage::Critical => {
                findings.push(format!("Severe TSP fouling: {:.2}", o.fouling_fraction));
                recommendations.push("Schedule mechanical cleaning".to_string());
            }
        }
        if o.flow_maldistribution > 0.1 {
            findings.push(format!("Flow maldistribution {:.2}", o.flow_maldistribution));
        }
        if o.replacement_recommended {
            recommendations.push("Evaluate TSP replacement".to_string());
        }
        if findings.is_empty() {
            findings.push("TSP condition within acceptable limits".to_string());
        }

        let mut result = MaintenanceResult::completed("TSP visual inspection", 8.0, 1.0, 4_380.0)
            .with_findings(findings.join("; "))
            .with_parts(&["Remote inspection camera"])
            .measure("average_thickness_mm", o.average_thickness_mm)
            .measure("max_thickness_mm", o.max_thickness_mm)
            .measure("fouling_fraction", o.fouling_fraction)
            .measure("flow_maldistribution", o.flow_maldistribution);
        for level in 0..self.deposits.len() {
            if let Some(t) = self.level_thickness_mm(level) {
                result = result.measure(&format!("level_{level}_thickness_mm"), t);
            }
        }
        result.recommendations = recommendations;
        result
    }

    fn flow_test(&self) -> MaintenanceResult {
        let o = self.outputs;
        let findings = if o.pressure_drop_ratio > 2.0 {
            format!(
                "Elevated TSP pressure drop: {:.2}x design, capacity {:.0}%",
                o.pressure_drop_ratio,
                o.flow_capacity * 100.0
            )
        } else {
            "TSP pressure drop within design range".to_string()
        };
        MaintenanceResult::completed("TSP flow test", 4.0, 1.0, 2_190.0)
            .with_findings(findings)
            .measure("pressure_drop_ratio", o.pressure_drop_ratio)
            .measure("flow_capacity", o.flow_capacity)
            .measure("heat_transfer_degradation", o.heat_transfer_degradation)
    }
}

impl FoulingModel for TspFoulingModel {
    fn name(&self) -> &'static str {
        "TSP"
    }

    fn fouling_fraction(&self) -> f64 {
        self.outputs.fouling_fraction
    }

    fn thickness_mm(&self) -> f64 {
        self.outputs.average_thickness_mm
    }

    fn clock(&self) -> &FoulingClock {
        &self.clock
    }

    fn history(&self) -> &MaintenanceHistory {
        &self.history
    }

    fn supported_actions(&self) -> &'static [&'static str] {
        TSP_ACTIONS
    }

    /// Cleaning actions take their method from `args.cleaning_type` when it
    /// is given; otherwise the action name selects it. `Combined` runs the
    /// mechanical path.
    fn perform_maintenance(&mut self, action: &str, args: &MaintenanceArgs) -> MaintenanceResult {
        let result = match action {
            "chemical_cleaning" | "mechanical_cleaning" => {
                let mechanical = match args.cleaning_type {
                    Some(CleaningMethod::Chemical) => false,
                    Some(CleaningMethod::Mechanical | CleaningMethod::Combined) => true,
                    None => action == "mechanical_cleaning",
                };
                self.cleaning(mechanical)
            }
            "secondary_side_cleaning" => self.secondary_side_cleaning(),
            "tsp_inspection" => self.inspection(),
            "tsp_flow_test" => self.flow_test(),
            _ => return MaintenanceResult::unsupported(action, self.name(), TSP_ACTIONS),
        };
        self.history.record(&mut self.clock, action, &result);
        info!(
            action,
            fouling_fraction = self.outputs.fouling_fraction,
            "TSP maintenance complete"
        );
        result
    }

    fn state_map(&self) -> StateMap {
        let o = &self.outputs;
        let mut map = StateMap::new();
        put(&mut map, "fouling_fraction", o.fouling_fraction);
        put(&mut map, "average_thickness_mm", o.average_thickness_mm);
        put(&mut map, "max_thickness_mm", o.max_thickness_mm);
        put(&mut map, "heat_transfer_degradation", o.heat_transfer_degradation);
        put(&mut map, "pressure_drop_ratio", o.pressure_drop_ratio);
        put(&mut map, "flow_capacity", o.flow_capacity);
        put(&mut map, "flow_maldistribution", o.flow_maldistribution);
        put(&mut map, "fouling_stage", o.stage.code());
        put(&mut map, "shutdown_required", flag(o.shutdown.is_some()));
        put(&mut map, "shutdown_reason", o.shutdown.map_or(0.0, |r| r.code()));
        put(&mut map, "replacement_recommended", flag(o.replacement_recommended));
        put(&mut map, "growth_rate_mm_per_year", o.growth_rate_mm_per_year);
        for species in DepositSpecies::ALL {
            put(
                &mut map,
                &format!("{}_thickness_mm", species.name()),
                self.species_thickness_mm(species),
            );
        }
        put(&mut map, "operating_years", self.clock.operating_years);
        put(&mut map, "years_since_cleaning", self.clock.years_since_cleaning);
        put(&mut map, "cleaning_cycles", self.clock.cleaning_cycles);
        put(&mut map, "cumulative_power_loss_mwh", self.cumulative_power_loss_mwh);
        map
    }

    fn reset(&mut self) {
        for row in &mut self.deposits {
            *row = [0.0; SPECIES_COUNT];
        }
        self.clock = FoulingClock::default();
        self.history.clear();
        self.cumulative_power_loss_mwh = 0.0;
        self.outputs = TspOutputs::default();
    }
}
