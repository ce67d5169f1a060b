//! Property tests for the per-step invariants.

use proptest::prelude::*;
use sg_chemistry::{ChemistryLevels, DesignChemistry};
use sg_fouling::FoulingModel;
use sg_unit::{StepInputs, SteamGeneratorConfig, SteamGeneratorUnit, limits};
use std::sync::Arc;

fn unit() -> SteamGeneratorUnit {
    SteamGeneratorUnit::new(
        SteamGeneratorConfig::default(),
        Arc::new(DesignChemistry::new(ChemistryLevels::default())),
    )
    .unwrap()
}

fn inputs() -> impl Strategy<Value = StepInputs> {
    (
        250.0f64..360.0,
        0.0f64..60.0,
        0.0f64..9000.0,
        0.0f64..1500.0,
        0.0f64..1500.0,
        20.0f64..300.0,
        1.0e-3f64..1.0e6,
    )
        .prop_map(|(t_out, dt_primary, primary, steam, fw, t_fw, dt)| StepInputs {
            primary_inlet_temp_c: t_out + dt_primary,
            primary_outlet_temp_c: t_out,
            primary_flow: primary,
            steam_flow: steam,
            feedwater_flow: fw,
            feedwater_temp_c: t_fw,
            dt_s: dt,
            chemistry_update: None,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_step_respects_invariants(steps in prop::collection::vec(inputs(), 1..12)) {
        let mut unit = unit();
        let mut tsp_prev = 0.0;
        let mut tube_prev = 0.0;
        for i in &steps {
            let r = unit.step(i);

            prop_assert!((limits::MIN_PRESSURE_MPA..=limits::MAX_PRESSURE_MPA).contains(&r.secondary_pressure));
            prop_assert!((limits::MIN_QUALITY..=limits::MAX_QUALITY).contains(&r.steam_quality));
            prop_assert!((limits::MIN_LEVEL_M..=limits::MAX_LEVEL_M).contains(&r.water_level));
            prop_assert!((0.0..=limits::MAX_VOID_FRACTION).contains(&r.steam_void_fraction));

            let cap = i.primary_flow * 5200.0
                * (i.primary_inlet_temp_c - i.primary_outlet_temp_c);
            prop_assert!(r.heat_transfer_rate >= 0.0);
            prop_assert!(r.heat_transfer_rate <= cap + 1e-6 * cap.max(1.0));

            if i.feedwater_flow < 0.1 {
                prop_assert_eq!(r.steam_production_rate, 0.0);
            }

            prop_assert!(r.flow_restriction_factor > 0.0 && r.flow_restriction_factor <= 1.0);
            prop_assert!(r.primary_flow_restriction_factor > 0.0
                && r.primary_flow_restriction_factor <= 1.0);
            prop_assert!(r.actual_steam_flow <= r.requested_steam_flow);
            prop_assert!(r.actual_feedwater_flow <= r.requested_feedwater_flow);
            prop_assert!(r.actual_primary_flow <= r.requested_primary_flow);

            prop_assert!((0.0..=1.0).contains(&r.tsp_fouling_fraction));
            prop_assert!((0.0..=1.0).contains(&r.tube_fouling_fraction));
            prop_assert!(unit.tsp().fouling_fraction() >= tsp_prev);
            prop_assert!(unit.tube_interior().thickness_mm() >= tube_prev);
            tsp_prev = unit.tsp().fouling_fraction();
            tube_prev = unit.tube_interior().thickness_mm();
        }
    }

    #[test]
    fn hostile_inputs_never_escape_bounds(
        a in prop::num::f64::ANY,
        b in prop::num::f64::ANY,
        flow in prop::num::f64::ANY,
        dt in prop::num::f64::ANY,
    ) {
        let mut unit = unit();
        let hostile = StepInputs {
            primary_inlet_temp_c: a,
            primary_outlet_temp_c: b,
            primary_flow: flow,
            steam_flow: flow,
            feedwater_flow: -flow,
            dt_s: dt,
            ..Default::default()
        };
        let huge_dt = StepInputs {
            dt_s: f64::MAX,
            ..hostile.clone()
        };
        for i in [hostile, huge_dt, StepInputs::default(), StepInputs::default()] {
            let r = unit.step(&i);
            prop_assert!(r.heat_transfer_rate.is_finite() && r.heat_transfer_rate >= 0.0);
            prop_assert!((1.0..=8.0).contains(&r.secondary_pressure));
            prop_assert!((8.0..=16.0).contains(&r.water_level));
            prop_assert!((0.9..=1.0).contains(&r.steam_quality));
            for (key, value) in unit.state_map() {
                prop_assert!(value.is_finite(), "{} = {}", key, value);
            }
        }
    }

    #[test]
    fn thicker_scale_runs_hotter(t1 in 0.0f64..2.0, extra in 0.01f64..2.0) {
        let inputs = StepInputs::default();
        let mut thin = unit();
        let mut thick = unit();
        thin.tube_interior_mut().set_thickness(t1);
        thick.tube_interior_mut().set_thickness(t1 + extra);
        let a = thin.step(&inputs);
        let b = thick.step(&inputs);
        prop_assert!(b.tube_wall_temperature > a.tube_wall_temperature);
    }

    #[test]
    fn snapshot_is_pure(steps in prop::collection::vec(inputs(), 0..4)) {
        let mut unit = unit();
        for i in &steps {
            unit.step(i);
        }
        prop_assert_eq!(unit.state_map(), unit.state_map());
    }
}
