//! End-to-end scenarios for a single steam generator unit.

use sg_chemistry::{ChemistryLevels, DesignChemistry};
use sg_core::{Tolerances, nearly_equal};
use sg_fouling::{FoulingModel, MaintenanceArgs, ScaleComposition};
use sg_unit::{DiagnosticKind, StepInputs, SteamGeneratorConfig, SteamGeneratorUnit};
use std::sync::Arc;

fn unit_with(levels: ChemistryLevels) -> SteamGeneratorUnit {
    SteamGeneratorUnit::new(
        SteamGeneratorConfig::default(),
        Arc::new(DesignChemistry::new(levels)),
    )
    .unwrap()
}

fn design_unit() -> SteamGeneratorUnit {
    unit_with(ChemistryLevels::default())
}

#[test]
fn design_steady_run_delivers_design_power() {
    let mut unit = design_unit();
    let inputs = StepInputs::default();
    let mut last = None;
    for _ in 0..60 {
        last = Some(unit.step(&inputs));
    }
    let report = last.unwrap();
    let error = (report.heat_transfer_rate - 1.0e9).abs() / 1.0e9;
    assert!(error < 0.05, "heat transfer {}", report.heat_transfer_rate);
    assert!(report.steam_production_rate > 0.0);
    assert!(unit.diagnostics().is_empty());
}

#[test]
fn feedwater_loss_stops_steam_generation() {
    let mut unit = design_unit();
    let level_before = unit.state().water_level_m;
    let report = unit.step(&StepInputs {
        feedwater_flow: 0.0,
        ..Default::default()
    });
    assert_eq!(report.steam_production_rate, 0.0);
    assert!(report.water_level < level_before);
}

#[test]
fn tsp_chemical_cleaning_removes_three_quarters() {
    let mut unit = design_unit();
    unit.tsp_mut().seed_deposits(1.5);
    assert!(nearly_equal(unit.tsp().fouling_fraction(), 0.30, Tolerances::EXACT));

    let result = unit.perform_maintenance("tsp_chemical_cleaning", &MaintenanceArgs::default());
    assert!(result.success);
    assert!(nearly_equal(
        unit.tsp().fouling_fraction(),
        0.30 * (1.0 - 0.75),
        Tolerances::EXACT
    ));
    assert!((0.0..=1.0).contains(&result.effectiveness_score));
}

#[test]
fn interior_scale_raises_tube_wall_temperature() {
    let harsh = ChemistryLevels {
        boric_acid_ppm: 100.0,
        ..Default::default()
    };
    let inputs = StepInputs {
        primary_inlet_temp_c: 335.0,
        primary_outlet_temp_c: 300.0,
        ..Default::default()
    };

    let mut baseline = unit_with(harsh);
    let mut scaled = unit_with(harsh);
    scaled.tube_interior_mut().set_thickness(1.0);

    let clean = baseline.step(&inputs);
    let fouled = scaled.step(&inputs);
    assert!(fouled.tube_wall_temperature > clean.tube_wall_temperature);
    assert!(fouled.tube_scale_thermal_resistance > 0.0);
}

#[test]
fn crud_insulates_more_than_iron_oxide() {
    let mut crud = design_unit();
    let mut oxide = design_unit();
    crud.tube_interior_mut().set_scale(ScaleComposition {
        iron_oxide: 0.1,
        crud: 0.8,
        corrosion_products: 0.1,
    });
    oxide.tube_interior_mut().set_scale(ScaleComposition {
        iron_oxide: 0.8,
        crud: 0.1,
        corrosion_products: 0.1,
    });
    let inputs = StepInputs::default();
    let a = crud.step(&inputs);
    let b = oxide.step(&inputs);
    assert!(a.tube_wall_temperature > b.tube_wall_temperature);
}

#[test]
fn unknown_maintenance_is_a_structured_failure() {
    let mut unit = design_unit();
    unit.step(&StepInputs::default());
    let before = unit.state_map();
    let result = unit.perform_maintenance("bogus_action", &MaintenanceArgs::default());
    assert!(!result.success);
    assert!(!result.findings.is_empty());
    assert_eq!(unit.state_map(), before);
}

#[test]
fn snapshot_is_stable_without_steps() {
    let mut unit = design_unit();
    unit.step(&StepInputs::default());
    let first = unit.state_map();
    let second = unit.state_map();
    assert_eq!(first, second);
    assert!(nearly_equal(first["max_steam_flow_capacity"], 555.0, Tolerances::STEPPED));
    assert!(nearly_equal(
        first["primary_flow_restriction_factor"],
        1.0,
        Tolerances::STEPPED
    ));
    assert!(first.contains_key("tsp_fouling_fraction"));
    assert!(first.contains_key("tube_scale_thickness_mm"));
}

#[test]
fn reset_after_long_run_restores_design() {
    let mut unit = design_unit();
    let design = unit.state_map();
    let inputs = StepInputs {
        dt_s: 86_400.0,
        ..Default::default()
    };
    for _ in 0..365 {
        unit.step(&inputs);
    }
    assert!(unit.tsp().fouling_fraction() > 0.0);
    assert!(unit.tube_interior().thickness_mm() > 0.0);
    unit.reset();
    assert_eq!(unit.state_map(), design);
}

#[test]
fn fouled_plates_clamp_requested_flow() {
    let mut unit = design_unit();
    unit.tsp_mut().seed_deposits(3.0);
    let report = unit.step(&StepInputs::default());
    assert!(report.actual_steam_flow < report.requested_steam_flow);
    assert!(report.flow_restriction_factor > 0.0 && report.flow_restriction_factor < 1.0);
    assert!(report.fouling_energy_penalty_mw > 0.0);
    assert!(report.net_thermal_efficiency < report.thermal_efficiency);
}

#[test]
fn config_round_trips_through_yaml() {
    let config = SteamGeneratorConfig::default();
    let text = serde_yaml::to_string(&config).unwrap();
    let back: SteamGeneratorConfig = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn report_serializes_to_json() {
    let mut unit = design_unit();
    let report = unit.step(&StepInputs::default());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["heat_transfer_rate"].as_f64().unwrap() > 0.0);
}

#[test]
fn oversized_steps_are_cut_and_snapshot_stays_finite() {
    let mut unit = design_unit();
    let max_dt = unit.config().max_time_step_s;
    for dt_s in [f64::MAX, 1.0e300, 1.0, 1.0] {
        let report = unit.step(&StepInputs {
            dt_s,
            ..Default::default()
        });
        if dt_s > max_dt {
            assert!(report.has(DiagnosticKind::InvalidTimeStep));
        } else {
            assert!(!report.has(DiagnosticKind::InvalidTimeStep));
        }
        assert!(report.tube_wall_temperature < 400.0);
        for (key, value) in unit.state_map() {
            assert!(value.is_finite(), "{key} = {value}");
        }
    }
    let two_days = 2.0 * max_dt / sg_core::SECONDS_PER_YEAR;
    assert!(unit.tube_interior().clock().operating_years <= two_days + 1e-6);
}
