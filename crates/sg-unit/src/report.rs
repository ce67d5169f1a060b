//! Step results and non-fatal diagnostics.

use serde::{Deserialize, Serialize};
use sg_core::{StateMap, flag, put};
use std::fmt;

/// Physical-guard or sanitation event raised while stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    NonFiniteInput,
    InvalidTimeStep,
    NegativeFlow,
    LowPrimaryFlow,
    LowPrimaryDeltaT,
    HeatTransferNonFinite,
    HighTubeWallTemperature,
    SecondaryFlowRestricted,
    PrimaryFlowRestricted,
    TspShutdownCondition,
    ReplacementRecommended,
}

/// One recorded diagnostic. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Quantity that triggered the diagnostic, when there is one.
    pub what: &'static str,
    pub value: f64,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, what: &'static str, value: f64) -> Self {
        Self { kind, what, value }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} = {}", self.kind, self.what, self.value)
    }
}

/// Everything one step produced.
///
/// `to_map` flattens this into the named numeric outputs consumed by
/// loggers and controllers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    // heat transfer
    pub heat_transfer_rate: f64,
    pub thermal_efficiency: f64,
    pub effectiveness: f64,
    pub tube_wall_temperature: f64,
    pub overall_htc: f64,
    pub overall_htc_fouled: f64,
    pub heat_flux: f64,
    pub lmtd: f64,
    pub h_primary: f64,
    pub h_secondary: f64,
    pub flow_factor: f64,
    pub pressure_factor: f64,

    // secondary state
    pub secondary_pressure: f64,
    pub secondary_temperature: f64,
    pub water_level: f64,
    pub steam_quality: f64,
    pub steam_void_fraction: f64,
    pub steam_production_rate: f64,
    pub steam_flow_rate: f64,
    pub feedwater_flow_rate: f64,
    pub pressure_change_rate: f64,
    pub level_change_rate: f64,
    pub mass_change_rate: f64,
    /// Net energy into the secondary (kW).
    pub energy_balance_kw: f64,

    // flow limits
    pub requested_steam_flow: f64,
    pub actual_steam_flow: f64,
    pub requested_feedwater_flow: f64,
    pub actual_feedwater_flow: f64,
    pub flow_restriction_factor: f64,
    pub requested_primary_flow: f64,
    pub actual_primary_flow: f64,
    pub primary_flow_restriction_factor: f64,

    // pumps
    pub base_pump_power_mw: f64,
    pub fouling_energy_penalty_mw: f64,
    pub total_pump_power_mw: f64,
    pub net_thermal_efficiency: f64,

    // fouling
    pub tsp_fouling_fraction: f64,
    pub tsp_fouling_stage: f64,
    pub tsp_heat_transfer_degradation: f64,
    pub tsp_pressure_drop_ratio: f64,
    pub tsp_operating_years: f64,
    pub tsp_shutdown_required: bool,
    pub tsp_replacement_recommended: bool,
    pub tsp_cleaning_cycles: u32,
    pub tube_scale_thickness_mm: f64,
    pub tube_scale_thermal_resistance: f64,
    pub tube_scale_formation_rate_mm_per_year: f64,
    pub tube_thermal_efficiency_loss: f64,
    pub tube_fouling_fraction: f64,
    pub tube_operating_years: f64,
    pub tube_replacement_recommended: bool,

    pub diagnostics: Vec<Diagnostic>,
}

impl StepReport {
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    /// Flat name -> value view of the report.
    pub fn to_map(&self) -> StateMap {
        let mut m = StateMap::new();
        put(&mut m, "heat_transfer_rate", self.heat_transfer_rate);
        put(&mut m, "thermal_efficiency", self.thermal_efficiency);
        put(&mut m, "effectiveness", self.effectiveness);
        put(&mut m, "tube_wall_temperature", self.tube_wall_temperature);
        put(&mut m, "overall_htc", self.overall_htc);
        put(&mut m, "overall_htc_fouled", self.overall_htc_fouled);
        put(&mut m, "heat_flux", self.heat_flux);
        put(&mut m, "lmtd", self.lmtd);
        put(&mut m, "h_primary", self.h_primary);
        put(&mut m, "h_secondary", self.h_secondary);
        put(&mut m, "flow_factor", self.flow_factor);
        put(&mut m, "pressure_factor", self.pressure_factor);

        put(&mut m, "secondary_pressure", self.secondary_pressure);
        put(&mut m, "secondary_temperature", self.secondary_temperature);
        put(&mut m, "water_level", self.water_level);
        put(&mut m, "steam_quality", self.steam_quality);
        put(&mut m, "steam_void_fraction", self.steam_void_fraction);
        put(&mut m, "steam_production_rate", self.steam_production_rate);
        put(&mut m, "steam_flow_rate", self.steam_flow_rate);
        put(&mut m, "feedwater_flow_rate", self.feedwater_flow_rate);
        put(&mut m, "pressure_change_rate", self.pressure_change_rate);
        put(&mut m, "level_change_rate", self.level_change_rate);
        put(&mut m, "mass_change_rate", self.mass_change_rate);
        put(&mut m, "energy_balance", self.energy_balance_kw);

        put(&mut m, "requested_steam_flow", self.requested_steam_flow);
        put(&mut m, "actual_steam_flow", self.actual_steam_flow);
        put(&mut m, "requested_feedwater_flow", self.requested_feedwater_flow);
        put(&mut m, "actual_feedwater_flow", self.actual_feedwater_flow);
        put(&mut m, "flow_restriction_factor", self.flow_restriction_factor);
        put(&mut m, "requested_primary_flow", self.requested_primary_flow);
        put(&mut m, "actual_primary_flow", self.actual_primary_flow);
        put(
            &mut m,
            "primary_flow_restriction_factor",
            self.primary_flow_restriction_factor,
        );

        put(&mut m, "base_pump_power_mw", self.base_pump_power_mw);
        put(&mut m, "fouling_energy_penalty_mw", self.fouling_energy_penalty_mw);
        put(&mut m, "total_pump_power_mw", self.total_pump_power_mw);
        put(&mut m, "net_thermal_efficiency", self.net_thermal_efficiency);

        put(&mut m, "tsp_fouling_fraction", self.tsp_fouling_fraction);
        put(&mut m, "tsp_fouling_stage", self.tsp_fouling_stage);
        put(
            &mut m,
            "tsp_heat_transfer_degradation",
            self.tsp_heat_transfer_degradation,
        );
        put(&mut m, "tsp_pressure_drop_ratio", self.tsp_pressure_drop_ratio);
        put(&mut m, "tsp_operating_years", self.tsp_operating_years);
        put(&mut m, "tsp_shutdown_required", flag(self.tsp_shutdown_required));
        put(
            &mut m,
            "tsp_replacement_recommended",
            flag(self.tsp_replacement_recommended),
        );
        put(&mut m, "tsp_cleaning_cycles", self.tsp_cleaning_cycles);
        put(&mut m, "tube_scale_thickness_mm", self.tube_scale_thickness_mm);
        put(
            &mut m,
            "tube_scale_thermal_resistance",
            self.tube_scale_thermal_resistance,
        );
        put(
            &mut m,
            "tube_scale_formation_rate_mm_per_year",
            self.tube_scale_formation_rate_mm_per_year,
        );
        put(&mut m, "tube_thermal_efficiency_loss", self.tube_thermal_efficiency_loss);
        put(&mut m, "tube_fouling_fraction", self.tube_fouling_fraction);
        put(&mut m, "tube_operating_years", self.tube_operating_years);
        put(
            &mut m,
            "tube_replacement_recommended",
            flag(self.tube_replacement_recommended),
        );

        put(&mut m, "diagnostic_count", self.diagnostics.len() as f64);
        m
    }
}
