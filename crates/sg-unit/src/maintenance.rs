//! Named maintenance actions accepted by a steam generator unit.
//!
//! Fouling actions are delegated to the owning model; the rest act on the
//! unit state directly. Unknown names return a failure result and change
//! nothing.

use crate::unit::SteamGeneratorUnit;
use sg_fouling::{FoulingModel, MaintenanceArgs, MaintenanceResult, RadiationExposure};
use tracing::{info, warn};

/// Best steam quality maintenance can restore.
const MAX_RESTORED_QUALITY: f64 = 0.999;

/// Every action name the unit accepts.
pub const UNIT_ACTIONS: &[&str] = &[
    "tsp_chemical_cleaning",
    "tsp_mechanical_cleaning",
    "tsp_inspection",
    "tsp_flow_test",
    "secondary_side_cleaning",
    "tube_bundle_inspection",
    "eddy_current_testing",
    "moisture_separator_maintenance",
    "routine_maintenance",
    "scale_removal",
    "primary_scale_cleaning",
    "tube_interior_scale_cleaning",
    "tube_interior_inspection",
    "primary_chemistry_optimization",
    "tube_eddy_current_testing",
    "tube_interior_eddy_current_testing",
    "water_chemistry_adjustment",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitAction {
    /// Forward to the TSP model under its own action name.
    Tsp(&'static str),
    /// Forward to the tube interior model under its own action name.
    TubeInterior(&'static str),
    TubeBundleInspection,
    EddyCurrentTesting,
    MoistureSeparator,
    Routine,
    WaterChemistryAdjustment,
}

fn resolve(action: &str) -> Option<UnitAction> {
    use UnitAction::*;
    let resolved = match action {
        "tsp_chemical_cleaning" => Tsp("chemical_cleaning"),
        "tsp_mechanical_cleaning" => Tsp("mechanical_cleaning"),
        "tsp_inspection" => Tsp("tsp_inspection"),
        "tsp_flow_test" => Tsp("tsp_flow_test"),
        "secondary_side_cleaning" => Tsp("secondary_side_cleaning"),
        "scale_removal" | "primary_scale_cleaning" | "tube_interior_scale_cleaning" => {
            TubeInterior("primary_scale_cleaning")
        }
        "tube_interior_inspection" => TubeInterior("tube_interior_inspection"),
        "primary_chemistry_optimization" => TubeInterior("primary_chemistry_optimization"),
        "tube_eddy_current_testing" | "tube_interior_eddy_current_testing" => {
            TubeInterior("tube_eddy_current_testing")
        }
        "tube_bundle_inspection" => TubeBundleInspection,
        "eddy_current_testing" => EddyCurrentTesting,
        "moisture_separator_maintenance" => MoistureSeparator,
        "routine_maintenance" => Routine,
        "water_chemistry_adjustment" => WaterChemistryAdjustment,
        _ => return None,
    };
    Some(resolved)
}

impl SteamGeneratorUnit {
    /// Run a named maintenance action.
    ///
    /// Takes effect immediately. Never panics or errors: unsupported names
    /// come back with `success == false` and a diagnostic in `findings`.
    pub fn perform_maintenance(&mut self, action: &str, args: &MaintenanceArgs) -> MaintenanceResult {
        let Some(resolved) = resolve(action) else {
            warn!(action, "unsupported steam generator maintenance action");
            return MaintenanceResult::unsupported(action, "steam generator", UNIT_ACTIONS);
        };

        let result = match resolved {
            UnitAction::Tsp(name) => return self.delegate_tsp(action, name, args),
            UnitAction::TubeInterior(name) => return self.delegate_tube(action, name, args),
            UnitAction::TubeBundleInspection => self.tube_bundle_inspection(),
            UnitAction::EddyCurrentTesting => self.eddy_current_testing(),
            UnitAction::MoistureSeparator => self.moisture_separator_maintenance(),
            UnitAction::Routine => self.routine_maintenance(),
            UnitAction::WaterChemistryAdjustment => self.water_chemistry_adjustment(args),
        };
        self.history.record(&mut self.clock, action, &result);
        info!(
            action,
            success = result.success,
            duration_hours = result.duration_hours,
            "steam generator maintenance"
        );
        result
    }

    fn delegate_tsp(
        &mut self,
        action: &str,
        name: &str,
        args: &MaintenanceArgs,
    ) -> MaintenanceResult {
        let result = self.tsp.perform_maintenance(name, args);
        info!(action, success = result.success, "delegated to TSP fouling model");
        result
    }

    fn delegate_tube(
        &mut self,
        action: &str,
        name: &str,
        args: &MaintenanceArgs,
    ) -> MaintenanceResult {
        let result = self.tube_interior.perform_maintenance(name, args);
        info!(action, success = result.success, "delegated to tube interior fouling model");
        result
    }

    fn tube_bundle_inspection(&self) -> MaintenanceResult {
        let tsp = self.tsp.outputs();
        let tube = self.tube_interior.outputs();
        let mut result = MaintenanceResult::completed(
            "tube bundle inspection",
            8.0,
            1.0,
            4380.0,
        )
        .with_findings(format!(
            "TSP fouling {:.1}%, heat transfer degradation {:.1}%, interior scale {:.3} mm, \
             tube wall {:.1} °C",
            tsp.fouling_fraction * 100.0,
            tsp.heat_transfer_degradation * 100.0,
            tube.thickness_mm,
            self.state.tube_wall_temp_c,
        ))
        .with_radiation(RadiationExposure::Moderate)
        .measure("tsp_fouling_fraction", tsp.fouling_fraction)
        .measure("tsp_heat_transfer_degradation", tsp.heat_transfer_degradation)
        .measure("tube_scale_thickness_mm", tube.thickness_mm)
        .measure("tube_wall_temperature", self.state.tube_wall_temp_c);
        if tsp.fouling_fraction > 0.15 {
            result.recommendations.push("schedule TSP chemical cleaning".into());
        }
        if self.state.tube_wall_temp_c > 350.0 {
            result.recommendations.push("schedule primary scale removal".into());
        }
        result
    }

    fn eddy_current_testing(&self) -> MaintenanceResult {
        let tubes = self.config.tube_count;
        let scale = self.tube_interior.outputs().thickness_mm;
        MaintenanceResult::completed("eddy current testing of tube bundle", 24.0, 1.0, 8760.0)
            .with_findings(format!(
                "{tubes} tubes examined, mean interior scale {scale:.3} mm"
            ))
            .with_parts(&["eddy current probes"])
            .with_radiation(RadiationExposure::Moderate)
            .measure("tubes_inspected", tubes as f64)
            .measure("tube_scale_thickness_mm", scale)
    }

    fn moisture_separator_maintenance(&mut self) -> MaintenanceResult {
        let before = self.state.steam_quality;
        if before < MAX_RESTORED_QUALITY {
            self.state.steam_quality = before + (MAX_RESTORED_QUALITY - before) * 0.8;
        }
        MaintenanceResult::completed("moisture separator maintenance", 6.0, 0.9, 4380.0)
            .with_findings(format!(
                "steam quality {:.4} -> {:.4}",
                before, self.state.steam_quality
            ))
            .with_parts(&["separator vanes", "dryer panels"])
            .with_radiation(RadiationExposure::Low)
            .measure("steam_quality_before", before)
            .measure("steam_quality_after", self.state.steam_quality)
    }

    fn routine_maintenance(&mut self) -> MaintenanceResult {
        let before = self.state.steam_quality;
        if before < MAX_RESTORED_QUALITY {
            self.state.steam_quality = (before + 0.001).min(MAX_RESTORED_QUALITY);
        }
        MaintenanceResult::completed("routine steam generator maintenance", 4.0, 0.8, 2190.0)
            .with_findings("routine checks completed")
            .with_radiation(RadiationExposure::Low)
            .measure("steam_quality_after", self.state.steam_quality)
    }

    fn water_chemistry_adjustment(&mut self, args: &MaintenanceArgs) -> MaintenanceResult {
        match &args.update {
            Some(update) if !update.is_empty() => {
                self.chemistry.update_chemistry_effects(update);
                let keys: Vec<&str> = update.keys().map(String::as_str).collect();
                MaintenanceResult::completed("water chemistry adjustment", 2.0, 0.95, 720.0)
                    .with_findings(format!("adjusted: {}", keys.join(", ")))
                    .with_parts(&["chemical additives"])
            }
            _ => MaintenanceResult {
                success: false,
                findings: "water chemistry adjustment needs a non-empty update".into(),
                ..Default::default()
            },
        }
    }
}
