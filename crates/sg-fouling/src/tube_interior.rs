//! Primary-side scale inside the steam generator tubes.
//!
//! Scale grows roughly an order of magnitude slower than TSP deposits and
//! adds a series thermal resistance on the primary side. Its composition
//! matters: CRUD conducts heat far worse than iron oxide.
//!
//! ## Model
//!
//! ```text
//! rate  = r0 · f_T · f_B · f_Li · f_pH · f_v · f_O2 · exp(-δ / δ_c)   (mm/yr, ≤ r_max)
//! f_B   = 1 / (1 + B/1000 · k_B)
//! f_Li  = max(0.5, 1 + (Li - 2) · 0.1)
//! f_v   = clip((v / v_ref)^-0.6, 0.5, 2.0)
//! k_eff = Σ δ_i k_i / Σ δ_i
//! R     = δ / k_eff + R_contact + δ · c_rough
//! ```

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
    HOURS_PER_YEAR, StateMap, clip, ensure_in_range, ensure_positive, finite_or, flag, mm_to_m,
    put, seconds_to_hours,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Maintenance actions understood by [`TubeInteriorFoulingModel`].
pub const TUBE_INTERIOR_ACTIONS: &[&str] = &[
    "primary_scale_cleaning",
    "tube_interior_inspection",
    "primary_chemistry_optimization",
    "tube_eddy_current_testing",
];

/// Thickness of each scale component (mm), or a split of new scale
/// (fractions) when used in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleComposition {
    pub iron_oxide: f64,
    pub crud: f64,
    pub corrosion_products: f64,
}

impl ScaleComposition {
    pub fn total(&self) -> f64 {
        self.iron_oxide + self.crud + self.corrosion_products
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            iron_oxide: self.iron_oxide * factor,
            crud: self.crud * factor,
            corrosion_products: self.corrosion_products * factor,
        }
    }

    fn add_split(&mut self, amount: f64, split: &ScaleComposition) {
        self.iron_oxide += amount * split.iron_oxide;
        self.crud += amount * split.crud;
        self.corrosion_products += amount * split.corrosion_products;
    }

    fn sanitized(&self) -> Self {
        Self {
            iron_oxide: finite_or(self.iron_oxide, 0.0).max(0.0),
            crud: finite_or(self.crud, 0.0).max(0.0),
            corrosion_products: finite_or(self.corrosion_products, 0.0).max(0.0),
        }
    }
}

/// Primary chemistry levels. Used as fallbacks when the provider does not
/// report a value, and as the targets chemistry optimization adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryChemistryTargets {
    pub boric_acid_ppm: f64,
    pub lithium_ppm: f64,
    pub ph: f64,
    pub dissolved_oxygen_ppm: f64,
}

impl Default for PrimaryChemistryTargets {
    fn default() -> Self {
        Self {
            boric_acid_ppm: 1000.0,
            lithium_ppm: 2.0,
            ph: 7.2,
            dissolved_oxygen_ppm: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeInteriorConfig {
    pub base_rate_mm_per_year: f64,
    /// Arrhenius activation energy (J/mol).
    pub activation_energy: f64,
    pub reference_temperature_c: f64,
    pub boric_acid_inhibition: f64,
    pub lithium_optimum_ppm: f64,
    pub lithium_sensitivity: f64,
    pub min_lithium_factor: f64,
    pub ph_optimal: f64,
    pub reference_velocity: f64,
    /// Must be negative: faster primary flow scours scale.
    pub velocity_exponent: f64,
    pub oxygen_factor: f64,
    /// Thickness scale of the self-limiting growth term (mm).
    pub characteristic_thickness_mm: f64,
    pub max_rate_mm_per_year: f64,

    /// Split of newly formed scale into components (fractions).
    pub deposit_split: ScaleComposition,
    /// Component conductivities (W/m/K).
    pub iron_oxide_conductivity: f64,
    pub crud_conductivity: f64,
    pub corrosion_products_conductivity: f64,
    pub clean_conductivity: f64,
    pub min_conductivity: f64,
    /// Interface resistance present whenever scale exists (m²K/W).
    pub contact_resistance: f64,
    /// Roughness resistance per metre of scale (m²K/W per m).
    pub roughness_coefficient: f64,
    /// Resistance at which fouling fraction reaches 1 (m²K/W).
    pub reference_resistance: f64,

    pub replacement_thickness_mm: f64,
    pub design_life_years: f64,

    pub chemical_cleaning_effectiveness: f64,
    pub mechanical_cleaning_effectiveness: f64,
    pub combined_cleaning_effectiveness: f64,
    pub default_sample_size: u32,

    pub chemistry_defaults: PrimaryChemistryTargets,
}

impl Default for TubeInteriorConfig {
    fn default() -> Self {
        Self {
            base_rate_mm_per_year: 0.001,
            activation_energy: 65_000.0,
            reference_temperature_c: 320.0,
            boric_acid_inhibition: 0.5,
            lithium_optimum_ppm: 2.0,
            lithium_sensitivity: 0.1,
            min_lithium_factor: 0.5,
            ph_optimal: 7.2,
            reference_velocity: 5.0,
            velocity_exponent: -0.6,
            oxygen_factor: 10.0,
            characteristic_thickness_mm: 2.0,
            max_rate_mm_per_year: 0.1,
            deposit_split: ScaleComposition {
                iron_oxide: 0.6,
                crud: 0.3,
                corrosion_products: 0.1,
            },
            iron_oxide_conductivity: 0.5,
            crud_conductivity: 0.15,
            corrosion_products_conductivity: 0.3,
            clean_conductivity: 0.2,
            min_conductivity: 0.05,
            contact_resistance: 1e-5,
            roughness_coefficient: 0.001,
            reference_resistance: 0.001,
            replacement_thickness_mm: 2.0,
            design_life_years: 40.0,
            chemical_cleaning_effectiveness: 0.90,
            mechanical_cleaning_effectiveness: 0.95,
            combined_cleaning_effectiveness: 0.85,
            default_sample_size: 100,
            chemistry_defaults: PrimaryChemistryTargets::default(),
        }
    }
}

impl TubeInteriorConfig {
    pub fn validate(&self) -> FoulingResult<()> {
        ensure_in_range(self.base_rate_mm_per_year, 0.0, f64::MAX, "base_rate_mm_per_year")?;
        ensure_positive(self.max_rate_mm_per_year, "max_rate_mm_per_year")?;
        ensure_positive(self.reference_velocity, "reference_velocity")?;
        ensure_positive(self.characteristic_thickness_mm, "characteristic_thickness_mm")?;
        ensure_positive(self.iron_oxide_conductivity, "iron_oxide_conductivity")?;
        ensure_positive(self.crud_conductivity, "crud_conductivity")?;
        ensure_positive(
            self.corrosion_products_conductivity,
            "corrosion_products_conductivity",
        )?;
        ensure_positive(self.clean_conductivity, "clean_conductivity")?;
        ensure_positive(self.min_conductivity, "min_conductivity")?;
        ensure_positive(self.reference_resistance, "reference_resistance")?;
        if !(self.velocity_exponent < 0.0) {
            return Err(FoulingError::InvalidArg {
                what: "velocity_exponent must be negative",
            });
        }
        let split = self.deposit_split.total();
        if (split - 1.0).abs() > 1e-6 {
            return Err(FoulingError::InvalidConfig {
                message: format!("deposit_split must sum to 1, got {split}"),
            });
        }
        for (value, what) in [
            (self.chemical_cleaning_effectiveness, "chemical_cleaning_effectiveness"),
            (self.mechanical_cleaning_effectiveness, "mechanical_cleaning_effectiveness"),
            (self.combined_cleaning_effectiveness, "combined_cleaning_effectiveness"),
        ] {
            ensure_in_range(value, 0.0, 1.0, what)?;
        }
        Ok(())
    }
}

/// Reduction of achievable primary flow caused by scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimaryFlowRestriction {
    pub effective_diameter_m: f64,
    pub area_ratio: f64,
    pub pressure_drop_ratio: f64,
    /// Achievable fraction of design primary flow, in (0, 1].
    pub flow_capacity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TubeInteriorOutputs {
    pub thickness_mm: f64,
    /// Scale thermal resistance (m²K/W).
    pub thermal_resistance: f64,
    pub fouling_fraction: f64,
    pub formation_rate_mm_per_year: f64,
    pub effective_conductivity: f64,
    pub thermal_efficiency_loss: f64,
    pub replacement_recommended: bool,
}

/// Tube-interior scale model for one steam generator.
#[derive(Debug, Clone)]
pub struct TubeInteriorFoulingModel {
    config: TubeInteriorConfig,
    chemistry: Arc<dyn ChemistryProvider>,
    composition: ScaleComposition,
    targets: PrimaryChemistryTargets,
    outputs: TubeInteriorOutputs,
    cumulative_performance_loss: f64,
    clock: FoulingClock,
    history: MaintenanceHistory,
}

impl TubeInteriorFoulingModel {
    /// Create a scale-free model.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation.
    pub fn new(
        config: TubeInteriorConfig,
        chemistry: Arc<dyn ChemistryProvider>,
    ) -> FoulingResult<Self> {
        config.validate()?;
        let targets = config.chemistry_defaults;
        let mut model = Self {
            config,
            chemistry,
            composition: ScaleComposition::default(),
            targets,
            outputs: TubeInteriorOutputs::default(),
            cumulative_performance_loss: 0.0,
            clock: FoulingClock::default(),
            history: MaintenanceHistory::default(),
        };
        model.recompute();
        Ok(model)
    }

    pub fn config(&self) -> &TubeInteriorConfig {
        &self.config
    }

    pub fn outputs(&self) -> &TubeInteriorOutputs {
        &self.outputs
    }

    pub fn composition(&self) -> &ScaleComposition {
        &self.composition
    }

    pub fn chemistry_targets(&self) -> &PrimaryChemistryTargets {
        &self.targets
    }

    /// Scale thermal resistance (m²K/W).
    pub fn thermal_resistance(&self) -> f64 {
        self.outputs.thermal_resistance
    }

    pub fn cumulative_performance_loss(&self) -> f64 {
        self.cumulative_performance_loss
    }

    /// Replace the scale with the given component thicknesses (mm).
    pub fn set_scale(&mut self, composition: ScaleComposition) {
        self.composition = composition.sanitized();
        self.recompute();
    }

    /// Replace the scale with `thickness_mm` of the configured split.
    pub fn set_thickness(&mut self, thickness_mm: f64) {
        let mut composition = ScaleComposition::default();
        composition.add_split(finite_or(thickness_mm, 0.0).max(0.0), &self.config.deposit_split);
        self.set_scale(composition);
    }

    /// Scale growth rate at the given conditions (mm/yr).
    ///
    /// # Arguments
    /// * `temperature_c` - Mean primary temperature (°C)
    /// * `velocity` - Tube velocity (m/s)
    /// * `chemistry` - Provider snapshot; missing values use the targets
    pub fn formation_rate(
        &self,
        temperature_c: f64,
        velocity: f64,
        chemistry: &ChemistryState,
    ) -> f64 {
        let c = &self.config;
        let t = &self.targets;
        let boron = chemistry.get_or(keys::BORIC_ACID, t.boric_acid_ppm).max(0.0);
        let lithium = chemistry.get_or(keys::LITHIUM, t.lithium_ppm).max(0.0);
        let ph = chemistry.get_or(keys::PRIMARY_PH, t.ph);
        let oxygen = chemistry
            .get_or(keys::PRIMARY_DISSOLVED_OXYGEN, t.dissolved_oxygen_ppm)
            .max(0.0);

        let f_t = temperature_factor(temperature_c, c.activation_energy, c.reference_temperature_c);
        let f_boron = 1.0 / (1.0 + boron / 1000.0 * c.boric_acid_inhibition);
        let f_lithium = (1.0 + (lithium - c.lithium_optimum_ppm) * c.lithium_sensitivity)
            .max(c.min_lithium_factor);
        let f_ph = ph_factor(ph, c.ph_optimal);
        let f_v = velocity_factor(velocity, c.reference_velocity, c.velocity_exponent);
        let f_oxygen = concentration_multiplier(oxygen, c.oxygen_factor);
        let saturation = (-self.outputs.thickness_mm / c.characteristic_thickness_mm).exp();

        let rate =
            c.base_rate_mm_per_year * f_t * f_boron * f_lithium * f_ph * f_v * f_oxygen * saturation;
        clip(finite_or(rate, 0.0), 0.0, c.max_rate_mm_per_year)
    }

    /// Advance scale growth by `dt_s` seconds.
    pub fn update(&mut self, temperature_c: f64, velocity: f64, dt_s: f64) -> TubeInteriorOutputs {
        let dt_years = self.clock.advance(dt_s);
        let chemistry = self.chemistry.chemistry_state();
        let rate = self.formation_rate(temperature_c, velocity, &chemistry);
        if dt_years > 0.0 {
            self.composition
                .add_split(rate * dt_years, &self.config.deposit_split);
        }

        let was_replacement = self.outputs.replacement_recommended;
        self.recompute();
        self.outputs.formation_rate_mm_per_year = rate;

        if dt_years > 0.0 {
            let total = self.cumulative_performance_loss
                + self.outputs.thermal_efficiency_loss * seconds_to_hours(dt_s) / HOURS_PER_YEAR;
            self.cumulative_performance_loss = finite_or(total, self.cumulative_performance_loss);
        }
        if !was_replacement && self.outputs.replacement_recommended {
            warn!(
                thickness_mm = self.outputs.thickness_mm,
                operating_years = self.clock.operating_years,
                "tube interior replacement recommended"
            );
        }
        self.outputs
    }

    /// Thickness-weighted conductivity of the current scale (W/m/K).
    pub fn effective_conductivity(&self) -> f64 {
        let c = &self.config;
        let s = &self.composition;
        let total = s.total();
        if total <= 0.0 {
            return c.clean_conductivity;
        }
        let weighted = s.iron_oxide * c.iron_oxide_conductivity
            + s.crud * c.crud_conductivity
            + s.corrosion_products * c.corrosion_products_conductivity;
        (weighted / total).max(c.min_conductivity)
    }

    /// Scale resistance for the current composition (m²K/W).
    pub fn compute_thermal_resistance(&self) -> f64 {
        let thickness_m = mm_to_m(self.composition.total());
        if thickness_m <= 0.0 {
            return 0.0;
        }
        thickness_m / self.effective_conductivity()
            + self.config.contact_resistance
            + thickness_m * self.config.roughness_coefficient
    }

    /// Achievable primary flow given the scale-narrowed tube bore.
    ///
    /// The bore never shrinks below half its clean diameter.
    ///
    /// # Arguments
    /// * `clean_inner_diameter_m` - Clean tube inner diameter (m)
    /// * `pump_pressure_margin` - Pressure-drop ratio the pumps can absorb
    pub fn primary_flow_restriction(
        &self,
        clean_inner_diameter_m: f64,
        pump_pressure_margin: f64,
    ) -> PrimaryFlowRestriction {
        let thickness_m = mm_to_m(self.outputs.thickness_mm);
        let d = clean_inner_diameter_m;
        let d_eff = (d - 2.0 * thickness_m).max(0.5 * d);
        let ratio = if d > 0.0 { d_eff / d } else { 1.0 };
        let area_ratio = ratio * ratio;
        let pressure_drop_ratio = 1.0 / ratio.powi(4);
        let flow_capacity = if pressure_drop_ratio <= pump_pressure_margin {
            area_ratio
        } else {
            area_ratio * (pump_pressure_margin.max(0.0) / pressure_drop_ratio).sqrt()
        };
        PrimaryFlowRestriction {
            effective_diameter_m: d_eff,
            area_ratio,
            pressure_drop_ratio,
            flow_capacity: clip(flow_capacity, f64::MIN_POSITIVE, 1.0),
        }
    }

    fn recompute(&mut self) {
        let thickness = self.composition.total();
        let resistance = self.compute_thermal_resistance();
        let c = &self.config;
        self.outputs = TubeInteriorOutputs {
            thickness_mm: thickness,
            thermal_resistance: resistance,
            fouling_fraction: clip(resistance / c.reference_resistance, 0.0, 1.0),
            formation_rate_mm_per_year: self.outputs.formation_rate_mm_per_year,
            effective_conductivity: self.effective_conductivity(),
            thermal_efficiency_loss: resistance * 1000.0,
            replacement_recommended: thickness >= c.replacement_thickness_mm
                || self.clock.operating_years > c.design_life_years,
        };
    }

    fn scale_cleaning(&mut self, method: CleaningMethod) -> MaintenanceResult {
        let c = &self.config;
        let (effectiveness, duration, description) = match method {
            CleaningMethod::Chemical => (
                c.chemical_cleaning_effectiveness,
                48.0,
                "chemical cleaning via tube interior access",
            ),
            CleaningMethod::Mechanical => (
                c.mechanical_cleaning_effectiveness,
                72.0,
                "mechanical cleaning with remote tools",
            ),
            CleaningMethod::Combined => (
                c.combined_cleaning_effectiveness,
                60.0,
                "combined chemical and mechanical cleaning",
            ),
        };

        let before = self.outputs;
        self.composition = self.composition.scaled(1.0 - effectiveness);
        self.recompute();
        let removed = before.thickness_mm - self.outputs.thickness_mm;

        MaintenanceResult::completed(
            format!("Primary side scale cleaning - {description}"),
            duration,
            effectiveness,
            35_040.0,
        )
        .with_findings(format!("Removed {removed:.3} mm of scale deposits"))
        .with_parts(&[
            "Chemical cleaning solutions",
            "Remote mechanical tools",
            "Radiation monitoring equipment",
        ])
        .with_radiation(RadiationExposure::High)
        .measure("scale_removed_mm", removed)
        .measure("remaining_scale_mm", self.outputs.thickness_mm)
        .measure(
            "thermal_resistance_reduction",
            before.thermal_resistance - self.outputs.thermal_resistance,
        )
    }

    fn inspection(&self) -> MaintenanceResult {
        let o = &self.outputs;
        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        if o.thickness_mm > 1.0 {
            findings.push(format!("Significant scale buildup: {:.2} mm", o.thickness_mm));
            recommendations.push("Schedule scale cleaning within next outage".to_string());
        }
        if o.formation_rate_mm_per_year > 0.01 {
            findings.push(format!(
                "Elevated scale formation rate: {:.3} mm/year",
                o.formation_rate_mm_per_year
            ));
            recommendations.push("Review primary chemistry control".to_string());
        }
        if o.thermal_resistance > 0.0005 {
            findings.push(format!(
                "Thermal resistance impact: {:.6} m²K/W",
                o.thermal_resistance
            ));
            recommendations.push("Consider thermal performance optimization".to_string());
        }
        let iron_fraction = self.composition.iron_oxide / o.thickness_mm.max(0.001);
        if iron_fraction > 0.8 {
            findings.push("High iron oxide content in scale deposits".to_string());
            recommendations.push("Investigate primary system corrosion sources".to_string());
        }
        if findings.is_empty() {
            findings.push("Tube interior condition within acceptable limits".to_string());
        }

        let mut result =
            MaintenanceResult::completed("Tube interior inspection", 8.0, 1.0, 8_760.0)
                .with_findings(findings.join("; "))
                .with_radiation(RadiationExposure::Moderate)
                .measure("scale_thickness_mm", o.thickness_mm)
                .measure("thermal_resistance", o.thermal_resistance)
                .measure("iron_oxide_mm", self.composition.iron_oxide)
                .measure("crud_mm", self.composition.crud)
                .measure("corrosion_products_mm", self.composition.corrosion_products);
        result.recommendations = recommendations;
        result
    }

    fn chemistry_optimization(&mut self, args: &MaintenanceArgs) -> MaintenanceResult {
        let target_boron = args.target_boric_acid_ppm.unwrap_or(1000.0);
        let target_lithium = args.target_lithium_ppm.unwrap_or(2.0);
        let target_ph = args.target_ph.unwrap_or(7.2);

        let chemistry = self.chemistry.chemistry_state();
        let boron = chemistry.get_or(keys::BORIC_ACID, self.targets.boric_acid_ppm);
        let old_rate = self.outputs.formation_rate_mm_per_year.max(0.001);

        let boron_gain = (boron / target_boron.max(1.0)).max(0.8);
        let lithium_gain = (2.0 / ((target_lithium - 2.0).abs() + 0.1).max(0.1)).max(0.9);
        let ph_gain = (1.0 / (1.0 + (target_ph - 7.2).abs())).max(0.9);
        let improvement = finite_or(boron_gain * lithium_gain * ph_gain, 1.0).max(0.1);
        let new_rate = old_rate / improvement;
        let reduction = old_rate - new_rate;

        self.targets.boric_acid_ppm = target_boron;
        self.targets.lithium_ppm = target_lithium;
        self.targets.ph = target_ph;
        self.outputs.formation_rate_mm_per_year = new_rate;

        MaintenanceResult::completed(
            "Primary chemistry optimization for scale control",
            4.0,
            reduction / old_rate * 10.0,
            2_190.0,
        )
        .with_findings(format!(
            "Reduced scale formation rate by {reduction:.4} mm/year"
        ))
        .with_parts(&[
            "Boric acid solution",
            "Lithium hydroxide solution",
            "Chemistry monitoring equipment",
        ])
        .with_radiation(RadiationExposure::Low)
        .measure("target_boric_acid_ppm", target_boron)
        .measure("target_lithium_ppm", target_lithium)
        .measure("target_ph", target_ph)
        .measure("scale_rate_improvement", reduction)
    }

    fn eddy_current_testing(&self, args: &MaintenanceArgs) -> MaintenanceResult {
        let sample = args.sample_size.unwrap_or(self.config.default_sample_size);
        let thickness = self.outputs.thickness_mm;
        let mut findings = Vec::new();
        if thickness > 0.5 {
            let affected = (sample as f64 * 0.8).floor();
            findings.push(format!(
                "Scale deposits detected in {affected:.0} of {sample} tubes tested"
            ));
        }

        let probability = (self.clock.operating_years / self.config.design_life_years) * 0.1
            + (thickness / 2.0) * 0.05;
        let defects = (sample as f64 * probability).floor().max(0.0);
        let recommendations = if defects > 0.0 {
            findings.push(format!("Detected {defects:.0} tubes with wall thinning or defects"));
            vec![
                "Schedule detailed inspection of affected tubes".to_string(),
                "Consider tube plugging if defects exceed limits".to_string(),
                "Increase scale cleaning frequency".to_string(),
            ]
        } else {
            findings.push("No significant tube defects detected".to_string());
            vec!["Continue normal inspection schedule".to_string()]
        };

        let mut result = MaintenanceResult::completed("Tube eddy current testing", 24.0, 1.0, 8_760.0)
            .with_findings(findings.join("; "))
            .with_parts(&["Eddy current probes", "Data acquisition system"])
            .with_radiation(RadiationExposure::Moderate)
            .measure("tubes_tested", sample as f64)
            .measure("defect_probability", probability)
            .measure("defects_found", defects);
        result.recommendations = recommendations;
        result
    }
}

impl FoulingModel for TubeInteriorFoulingModel {
    fn name(&self) -> &'static str {
        "tube interior"
    }

    fn fouling_fraction(&self) -> f64 {
        self.outputs.fouling_fraction
    }

    fn thickness_mm(&self) -> f64 {
        self.outputs.thickness_mm
    }

    fn clock(&self) -> &FoulingClock {
        &self.clock
    }

    fn history(&self) -> &MaintenanceHistory {
        &self.history
    }

    fn supported_actions(&self) -> &'static [&'static str] {
        TUBE_INTERIOR_ACTIONS
    }

    fn perform_maintenance(&mut self, action: &str, args: &MaintenanceArgs) -> MaintenanceResult {
        let result = match action {
            "primary_scale_cleaning" => {
                self.scale_cleaning(args.cleaning_type.unwrap_or_default())
            }
            "tube_interior_inspection" => self.inspection(),
            "primary_chemistry_optimization" => self.chemistry_optimization(args),
            "tube_eddy_current_testing" => self.eddy_current_testing(args),
            _ => {
                return MaintenanceResult::unsupported(action, self.name(), TUBE_INTERIOR_ACTIONS);
            }
        };
        self.history.record(&mut self.clock, action, &result);
        info!(
            action,
            thickness_mm = self.outputs.thickness_mm,
            "tube interior maintenance complete"
        );
        result
    }

    fn state_map(&self) -> StateMap {
        let o = &self.outputs;
        let mut map = StateMap::new();
        put(&mut map, "scale_thickness_mm", o.thickness_mm);
        put(&mut map, "thermal_resistance", o.thermal_resistance);
        put(&mut map, "fouling_fraction", o.fouling_fraction);
        put(&mut map, "formation_rate_mm_per_year", o.formation_rate_mm_per_year);
        put(&mut map, "effective_conductivity", o.effective_conductivity);
        put(&mut map, "thermal_efficiency_loss", o.thermal_efficiency_loss);
        put(&mut map, "replacement_recommended", flag(o.replacement_recommended));
        put(&mut map, "iron_oxide_mm", self.composition.iron_oxide);
        put(&mut map, "crud_mm", self.composition.crud);
        put(&mut map, "corrosion_products_mm", self.composition.corrosion_products);
        put(&mut map, "target_boric_acid_ppm", self.targets.boric_acid_ppm);
        put(&mut map, "target_lithium_ppm", self.targets.lithium_ppm);
        put(&mut map, "target_ph", self.targets.ph);
        put(&mut map, "operating_years", self.clock.operating_years);
        put(&mut map, "years_since_cleaning", self.clock.years_since_cleaning);
        put(&mut map, "cleaning_cycles", self.clock.cleaning_cycles);
        put(&mut map, "cumulative_performance_loss", self.cumulative_performance_loss);
        map
    }

    fn reset(&mut self) {
        self.composition = ScaleComposition::default();
        self.targets = self.config.chemistry_defaults;
        self.clock = FoulingClock::default();
        self.history.clear();
        self.cumulative_performance_loss = 0.0;
        self.outputs = TubeInteriorOutputs::default();
        self.recompute();
    }
}
