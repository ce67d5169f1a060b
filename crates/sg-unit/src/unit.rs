//! One steam generator: state, both fouling models, and the step loop.

use crate::config::SteamGeneratorConfig;
use crate::error::SimResult;
use crate::flow_limits::{ClampedFlow, PumpEnergy, SecondaryFlowLimit};
use crate::heat_transfer::{self, HeatTransferGuard, HeatTransferInputs, tsp_deposit_resistance};
use crate::inputs::StepInputs;
use crate::report::{Diagnostic, DiagnosticKind, StepReport};
use crate::secondary::{self, SecondaryConditions, SecondaryDrive};
use crate::state::SteamGeneratorState;
use sg_chemistry::ChemistryProvider;
use sg_core::{StateMap, merge_prefixed, put};
use sg_fouling::{
    FoulingClock, FoulingModel, MaintenanceHistory, TspFoulingModel, TubeInteriorFoulingModel,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Restriction factor below which a clamped flow is reported.
const RESTRICTION_REPORT_FACTOR: f64 = 0.999;

/// A single steam generator.
///
/// Owns its thermal-hydraulic state and both fouling models; shares the
/// chemistry provider with whoever built it.
#[derive(Debug, Clone)]
pub struct SteamGeneratorUnit {
    pub(crate) config: SteamGeneratorConfig,
    pub(crate) chemistry: Arc<dyn ChemistryProvider>,
    pub(crate) state: SteamGeneratorState,
    pub(crate) tsp: TspFoulingModel,
    pub(crate) tube_interior: TubeInteriorFoulingModel,
    /// Unit operating time and unit-level maintenance.
    pub(crate) clock: FoulingClock,
    pub(crate) history: MaintenanceHistory,
    diagnostics: Vec<Diagnostic>,
}

impl SteamGeneratorUnit {
    /// Build a unit at the design point.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration (including the nested
    /// fouling configurations) fails validation.
    pub fn new(
        config: SteamGeneratorConfig,
        chemistry: Arc<dyn ChemistryProvider>,
    ) -> SimResult<Self> {
        config.validate()?;
        let tsp = TspFoulingModel::new(config.tsp.clone(), Arc::clone(&chemistry))?;
        let tube_interior =
            TubeInteriorFoulingModel::new(config.tube_interior.clone(), Arc::clone(&chemistry))?;
        let state = SteamGeneratorState::design(&config);
        Ok(Self {
            config,
            chemistry,
            state,
            tsp,
            tube_interior,
            clock: FoulingClock::default(),
            history: MaintenanceHistory::default(),
            diagnostics: Vec::new(),
        })
    }

    pub fn config(&self) -> &SteamGeneratorConfig {
        &self.config
    }

    pub fn state(&self) -> &SteamGeneratorState {
        &self.state
    }

    pub fn chemistry(&self) -> &Arc<dyn ChemistryProvider> {
        &self.chemistry
    }

    pub fn tsp(&self) -> &TspFoulingModel {
        &self.tsp
    }

    pub fn tsp_mut(&mut self) -> &mut TspFoulingModel {
        &mut self.tsp
    }

    pub fn tube_interior(&self) -> &TubeInteriorFoulingModel {
        &self.tube_interior
    }

    pub fn tube_interior_mut(&mut self) -> &mut TubeInteriorFoulingModel {
        &mut self.tube_interior
    }

    pub fn clock(&self) -> &FoulingClock {
        &self.clock
    }

    /// Unit-level maintenance records. Delegated fouling actions are
    /// recorded by the fouling model instead.
    pub fn history(&self) -> &MaintenanceHistory {
        &self.history
    }

    /// Diagnostics raised by the most recent step.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Mean primary velocity in the tubes (m/s).
    pub fn tube_velocity(&self, primary_flow: f64) -> f64 {
        primary_flow / (1000.0 * self.config.tube_flow_area())
    }

    /// Advance the unit by one step.
    ///
    /// Heat transfer uses the fouling state left by the previous step;
    /// both fouling models then advance, and the flow limits use their
    /// fresh outputs. Never fails: bad inputs are substituted and recorded
    /// as diagnostics.
    pub fn step(&mut self, inputs: &StepInputs) -> StepReport {
        let mut diagnostics = Vec::new();
        let i = inputs.sanitized(&self.state, self.config.max_time_step_s, &mut diagnostics);
        for d in &diagnostics {
            warn!(kind = ?d.kind, what = d.what, value = d.value, "step input substituted");
        }

        // Heat transfer against last step's fouling
        let tsp_before = *self.tsp.outputs();
        let ht = heat_transfer::compute(
            &self.config,
            &HeatTransferInputs {
                primary_inlet_temp_c: i.primary_inlet_temp_c,
                primary_outlet_temp_c: i.primary_outlet_temp_c,
                primary_flow: i.primary_flow,
                secondary_pressure_mpa: self.state.secondary_pressure_mpa,
                water_level_m: self.state.water_level_m,
                tsp_degradation: tsp_before.heat_transfer_degradation,
                tsp_deposit_resistance: tsp_deposit_resistance(
                    tsp_before.average_thickness_mm,
                    tsp_before.fouling_fraction,
                ),
                scale_resistance: self.tube_interior.thermal_resistance(),
            },
        );
        if let Some(guard) = ht.guard {
            let diagnostic = match guard {
                HeatTransferGuard::LowPrimaryFlow => Diagnostic::new(
                    DiagnosticKind::LowPrimaryFlow,
                    "primary_flow",
                    i.primary_flow,
                ),
                HeatTransferGuard::LowPrimaryDeltaT => Diagnostic::new(
                    DiagnosticKind::LowPrimaryDeltaT,
                    "primary_delta_t",
                    i.primary_inlet_temp_c - i.primary_outlet_temp_c,
                ),
                HeatTransferGuard::NonFinite => Diagnostic::new(
                    DiagnosticKind::HeatTransferNonFinite,
                    "heat_transfer_rate",
                    f64::NAN,
                ),
            };
            warn!(?guard, value = diagnostic.value, "heat transfer guard applied");
            diagnostics.push(diagnostic);
        }
        if ht.tube_wall_temp_c > self.config.tube_wall_temperature_alarm_c {
            warn!(
                tube_wall_temp = ht.tube_wall_temp_c,
                scale_thickness_mm = self.tube_interior.outputs().thickness_mm,
                "high tube wall temperature"
            );
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::HighTubeWallTemperature,
                "tube_wall_temperature",
                ht.tube_wall_temp_c,
            ));
        }
        self.state.secondary_temperature_c = ht.saturation_temp_c;

        if let Some(update) = &i.chemistry_update {
            self.chemistry.update_chemistry_effects(update);
        }

        // Fouling advances
        let velocity = self.tube_velocity(i.primary_flow);
        let tsp = self.tsp.update(ht.saturation_temp_c, velocity, i.dt_s);
        let mean_primary_temp = (i.primary_inlet_temp_c + i.primary_outlet_temp_c) / 2.0;
        let tube = self.tube_interior.update(mean_primary_temp, velocity, i.dt_s);
        if tsp.shutdown.is_some() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::TspShutdownCondition,
                "tsp_fouling_fraction",
                tsp.fouling_fraction,
            ));
        }
        if tsp.replacement_recommended {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ReplacementRecommended,
                "tsp_fouling_fraction",
                tsp.fouling_fraction,
            ));
        }
        if tube.replacement_recommended {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ReplacementRecommended,
                "tube_scale_thickness_mm",
                tube.thickness_mm,
            ));
        }

        // Flow limits from the fresh fouling state
        let secondary_limit = SecondaryFlowLimit::new(
            i.steam_flow,
            i.feedwater_flow,
            self.config.design_steam_flow,
            self.config.design_feedwater_flow,
            tsp.pressure_drop_ratio,
        );
        let restriction = self.tube_interior.primary_flow_restriction(
            self.config.tube_inner_diameter_m,
            self.config.pump_pressure_margin,
        );
        let primary = ClampedFlow::new(
            i.primary_flow,
            self.config.primary_design_flow,
            restriction.flow_capacity,
        );
        if secondary_limit.steam.factor < RESTRICTION_REPORT_FACTOR
            || secondary_limit.feedwater.factor < RESTRICTION_REPORT_FACTOR
        {
            warn!(
                requested_steam = secondary_limit.steam.requested,
                actual_steam = secondary_limit.steam.actual,
                "secondary flow limited by TSP fouling"
            );
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::SecondaryFlowRestricted,
                "flow_restriction_factor",
                secondary_limit.factor(),
            ));
        }
        if primary.factor < RESTRICTION_REPORT_FACTOR {
            warn!(
                requested = primary.requested,
                actual = primary.actual,
                "primary flow limited by tube scale"
            );
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::PrimaryFlowRestricted,
                "primary_flow_restriction_factor",
                primary.factor,
            ));
        }
        let pump = PumpEnergy::new(self.config.base_pump_power_mw, tsp.pressure_drop_ratio);

        // Secondary side
        let dynamics = secondary::integrate(
            &self.config,
            &SecondaryConditions {
                pressure_mpa: self.state.secondary_pressure_mpa,
                water_level_m: self.state.water_level_m,
                steam_quality: self.state.steam_quality,
            },
            &SecondaryDrive {
                heat_input_w: ht.heat_transfer_rate,
                steam_flow: secondary_limit.steam.actual,
                feedwater_flow: secondary_limit.feedwater.actual,
                feedwater_temp_c: i.feedwater_temp_c,
                dt_s: i.dt_s,
            },
        );

        // Commit
        let s = &mut self.state;
        s.primary_inlet_temp_c = i.primary_inlet_temp_c;
        s.primary_outlet_temp_c = i.primary_outlet_temp_c;
        s.secondary_pressure_mpa = dynamics.pressure_mpa;
        s.water_level_m = dynamics.water_level_m;
        s.steam_quality = dynamics.steam_quality;
        s.void_fraction = dynamics.void_fraction;
        s.steam_flow = secondary_limit.steam.actual;
        s.feedwater_flow = secondary_limit.feedwater.actual;
        s.feedwater_temp_c = i.feedwater_temp_c;
        s.tube_wall_temp_c = ht.tube_wall_temp_c;
        s.heat_transfer_rate_w = ht.heat_transfer_rate;
        s.overall_htc = ht.overall_htc;
        s.heat_flux = ht.heat_flux;
        self.clock.advance(i.dt_s);

        let design_power = self.config.design_thermal_power_w;
        let max_possible =
            i.primary_flow * self.config.primary_cp * (i.primary_inlet_temp_c - ht.saturation_temp_c);
        let effectiveness = if max_possible > 0.0 {
            ht.heat_transfer_rate / max_possible
        } else {
            0.0
        };

        let report = StepReport {
            heat_transfer_rate: ht.heat_transfer_rate,
            thermal_efficiency: ht.heat_transfer_rate / design_power,
            effectiveness,
            tube_wall_temperature: ht.tube_wall_temp_c,
            overall_htc: ht.overall_htc,
            overall_htc_fouled: ht.overall_htc_fouled,
            heat_flux: ht.heat_flux,
            lmtd: ht.lmtd,
            h_primary: ht.h_primary,
            h_secondary: ht.h_secondary,
            flow_factor: ht.flow_factor,
            pressure_factor: ht.pressure_factor,

            secondary_pressure: self.state.secondary_pressure_mpa,
            secondary_temperature: self.state.secondary_temperature_c,
            water_level: self.state.water_level_m,
            steam_quality: self.state.steam_quality,
            steam_void_fraction: self.state.void_fraction,
            steam_production_rate: dynamics.steam_generation_rate,
            steam_flow_rate: self.state.steam_flow,
            feedwater_flow_rate: self.state.feedwater_flow,
            pressure_change_rate: dynamics.pressure_change_rate,
            level_change_rate: dynamics.level_change_rate,
            mass_change_rate: dynamics.mass_change_rate,
            energy_balance_kw: dynamics.energy_balance_kw,

            requested_steam_flow: secondary_limit.steam.requested,
            actual_steam_flow: secondary_limit.steam.actual,
            requested_feedwater_flow: secondary_limit.feedwater.requested,
            actual_feedwater_flow: secondary_limit.feedwater.actual,
            flow_restriction_factor: secondary_limit.factor(),
            requested_primary_flow: primary.requested,
            actual_primary_flow: primary.actual,
            primary_flow_restriction_factor: primary.factor,

            base_pump_power_mw: pump.base_mw,
            fouling_energy_penalty_mw: pump.fouling_penalty_mw,
            total_pump_power_mw: pump.total_mw,
            net_thermal_efficiency: (ht.heat_transfer_rate - pump.total_mw * 1.0e6) / design_power,

            tsp_fouling_fraction: tsp.fouling_fraction,
            tsp_fouling_stage: tsp.stage.code(),
            tsp_heat_transfer_degradation: tsp.heat_transfer_degradation,
            tsp_pressure_drop_ratio: tsp.pressure_drop_ratio,
            tsp_operating_years: self.tsp.clock().operating_years,
            tsp_shutdown_required: tsp.shutdown.is_some(),
            tsp_replacement_recommended: tsp.replacement_recommended,
            tsp_cleaning_cycles: self.tsp.clock().cleaning_cycles,
            tube_scale_thickness_mm: tube.thickness_mm,
            tube_scale_thermal_resistance: tube.thermal_resistance,
            tube_scale_formation_rate_mm_per_year: tube.formation_rate_mm_per_year,
            tube_thermal_efficiency_loss: tube.thermal_efficiency_loss,
            tube_fouling_fraction: tube.fouling_fraction,
            tube_operating_years: self.tube_interior.clock().operating_years,
            tube_replacement_recommended: tube.replacement_recommended,

            diagnostics: diagnostics.clone(),
        };

        debug!(
            heat_transfer_mw = ht.heat_transfer_rate / 1.0e6,
            pressure = self.state.secondary_pressure_mpa,
            level = self.state.water_level_m,
            quality = self.state.steam_quality,
            tsp_fouling = tsp.fouling_fraction,
            scale_mm = tube.thickness_mm,
            diagnostics = diagnostics.len(),
            "steam generator step"
        );
        self.diagnostics = diagnostics;
        report
    }

    /// Flat snapshot of the unit. Does not mutate anything.
    ///
    /// Flow capacities and restriction factors are evaluated at design
    /// flows against the current fouling.
    pub fn state_map(&self) -> StateMap {
        let mut map = self.state.to_map();

        let tsp_pdr = self.tsp.pressure_drop_ratio();
        let secondary = SecondaryFlowLimit::new(
            self.config.design_steam_flow,
            self.config.design_feedwater_flow,
            self.config.design_steam_flow,
            self.config.design_feedwater_flow,
            tsp_pdr,
        );
        let restriction = self.tube_interior.primary_flow_restriction(
            self.config.tube_inner_diameter_m,
            self.config.pump_pressure_margin,
        );
        let primary = ClampedFlow::new(
            self.config.primary_design_flow,
            self.config.primary_design_flow,
            restriction.flow_capacity,
        );
        put(&mut map, "primary_flow_restriction_factor", primary.factor);
        put(&mut map, "secondary_flow_restriction_factor", secondary.factor());
        put(&mut map, "max_primary_flow_capacity", primary.actual);
        put(&mut map, "max_steam_flow_capacity", secondary.steam.actual);
        put(&mut map, "max_feedwater_flow_capacity", secondary.feedwater.actual);
        put(&mut map, "primary_pressure_drop_ratio", restriction.pressure_drop_ratio);

        let pump = PumpEnergy::new(self.config.base_pump_power_mw, tsp_pdr);
        put(&mut map, "base_pump_power_mw", pump.base_mw);
        put(&mut map, "fouling_energy_penalty_mw", pump.fouling_penalty_mw);
        put(&mut map, "total_pump_power_mw", pump.total_mw);

        merge_prefixed(&mut map, "tsp_", &self.tsp.state_map());
        merge_prefixed(&mut map, "tube_", &self.tube_interior.state_map());

        put(&mut map, "unit_operating_years", self.clock.operating_years);
        put(&mut map, "unit_maintenance_count", self.clock.cleaning_cycles);
        put(&mut map, "diagnostic_count", self.diagnostics.len() as f64);
        map
    }

    /// Return to the design point with clean fouling models.
    ///
    /// The chemistry provider is not owned by the unit and is left as is.
    pub fn reset(&mut self) {
        self.state = SteamGeneratorState::design(&self.config);
        self.tsp.reset();
        self.tube_interior.reset();
        self.clock = FoulingClock::default();
        self.history.clear();
        self.diagnostics.clear();
        info!("steam generator reset to design point");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_chemistry::{ChemistryLevels, DesignChemistry};

    fn unit() -> SteamGeneratorUnit {
        let chemistry = Arc::new(DesignChemistry::new(ChemistryLevels::default()));
        SteamGeneratorUnit::new(SteamGeneratorConfig::default(), chemistry).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let chemistry = Arc::new(DesignChemistry::new(ChemistryLevels::default()));
        let config = SteamGeneratorConfig {
            primary_design_flow: -1.0,
            ..Default::default()
        };
        assert!(SteamGeneratorUnit::new(config, chemistry).is_err());
    }

    #[test]
    fn design_step_reports_full_map() {
        let mut unit = unit();
        let report = unit.step(&StepInputs::default());
        let map = report.to_map();
        assert!(map.len() >= 45);
        assert!(map.values().all(|v| v.is_finite()));
        assert!(report.flow_restriction_factor > 0.999_999);
        assert!(report.primary_flow_restriction_factor > 0.999_999);
        assert!(unit.diagnostics().is_empty());
        assert!(report.tsp_operating_years > 0.0);
    }

    #[test]
    fn heat_transfer_uses_previous_fouling() {
        let mut unit = unit();
        let clean = unit.step(&StepInputs::default());
        unit.tsp_mut().seed_deposits(4.0);
        let lagged = unit.step(&StepInputs::default());
        // degradation changed before this step, so it is seen now
        assert!(lagged.overall_htc_fouled < clean.overall_htc_fouled);
        assert!(lagged.flow_restriction_factor < 1.0);
    }

    #[test]
    fn chemistry_update_reaches_provider() {
        let mut unit = unit();
        let mut update = sg_chemistry::ChemistryUpdate::new();
        update.insert(sg_chemistry::keys::IRON.to_string(), 0.4);
        unit.step(&StepInputs {
            chemistry_update: Some(update),
            ..Default::default()
        });
        let iron = unit.chemistry().chemistry_state().iron_ppm;
        assert_eq!(iron, Some(0.4));
    }

    #[test]
    fn bad_inputs_produce_diagnostics_not_errors() {
        let mut unit = unit();
        let report = unit.step(&StepInputs {
            primary_flow: f64::NAN,
            dt_s: -1.0,
            ..Default::default()
        });
        assert!(report.has(DiagnosticKind::NonFiniteInput));
        assert!(report.has(DiagnosticKind::InvalidTimeStep));
        assert!(report.has(DiagnosticKind::LowPrimaryFlow));
        assert_eq!(report.heat_transfer_rate, 0.0);
        assert_eq!(unit.diagnostics().len(), report.diagnostics.len());
    }

    #[test]
    fn reset_restores_design_point() {
        let mut unit = unit();
        let initial = unit.state_map();
        for _ in 0..10 {
            unit.step(&StepInputs {
                feedwater_flow: 0.0,
                dt_s: 3600.0,
                ..Default::default()
            });
        }
        assert_ne!(unit.state_map(), initial);
        unit.reset();
        assert_eq!(unit.state_map(), initial);
        assert_eq!(unit.state(), &SteamGeneratorState::design(unit.config()));
    }
}
