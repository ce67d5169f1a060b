//! Multi-year fouling behaviour under shared chemistry.

use proptest::prelude::*;
use sg_chemistry::{ChemistryProvider, ChemistryUpdate, DesignChemistry, keys};
use sg_core::{SECONDS_PER_YEAR, Tolerances, nearly_equal};
use sg_fouling::{
    FoulingModel, MaintenanceArgs, TspFoulingConfig, TspFoulingModel, TubeInteriorConfig,
    TubeInteriorFoulingModel,
};
use std::sync::Arc;

fn models(chem: Arc<dyn ChemistryProvider>) -> (TspFoulingModel, TubeInteriorFoulingModel) {
    (
        TspFoulingModel::new(TspFoulingConfig::default(), chem.clone()).unwrap(),
        TubeInteriorFoulingModel::new(TubeInteriorConfig::default(), chem).unwrap(),
    )
}

#[test]
fn tsp_outpaces_tube_interior() {
    let (mut tsp, mut tube) = models(Arc::new(DesignChemistry::default()));
    for _ in 0..20 {
        tsp.update(285.0, 5.9, SECONDS_PER_YEAR);
        tube.update(310.0, 5.9, SECONDS_PER_YEAR);
    }
    assert!(tsp.thickness_mm() > 5.0 * tube.thickness_mm());
    assert!(nearly_equal(tsp.clock().operating_years, 20.0, Tolerances::EXACT));
    assert!(nearly_equal(tube.clock().operating_years, 20.0, Tolerances::EXACT));
}

#[test]
fn provider_changes_are_seen_by_both_models() {
    let chem = Arc::new(DesignChemistry::default());
    let (mut tsp, mut tube) = models(chem.clone());
    let (mut tsp_ref, mut tube_ref) = models(Arc::new(DesignChemistry::default()));

    let mut update = ChemistryUpdate::new();
    update.insert(keys::IRON.to_string(), 1.0);
    update.insert(keys::BORIC_ACID.to_string(), 100.0);
    chem.update_chemistry_effects(&update);

    for _ in 0..5 {
        tsp.update(285.0, 5.9, SECONDS_PER_YEAR);
        tube.update(320.0, 5.9, SECONDS_PER_YEAR);
        tsp_ref.update(285.0, 5.9, SECONDS_PER_YEAR);
        tube_ref.update(320.0, 5.9, SECONDS_PER_YEAR);
    }
    assert!(tsp.thickness_mm() > tsp_ref.thickness_mm());
    assert!(tube.thickness_mm() > tube_ref.thickness_mm());
}

#[test]
fn cleaning_resets_time_since_cleaning_only() {
    let (mut tsp, _) = models(Arc::new(DesignChemistry::default()));
    tsp.update(285.0, 5.9, 3.0 * SECONDS_PER_YEAR);
    tsp.perform_maintenance("mechanical_cleaning", &MaintenanceArgs::default());
    assert_eq!(tsp.clock().years_since_cleaning, 0.0);
    assert!(nearly_equal(tsp.clock().operating_years, 3.0, Tolerances::EXACT));
    let record = tsp.history().last().unwrap();
    assert_eq!(record.action, "mechanical_cleaning");
    assert!(nearly_equal(record.operating_years, 3.0, Tolerances::EXACT));
}

proptest! {
    #[test]
    fn fouling_never_decreases_without_maintenance(
        steps in prop::collection::vec((-50.0_f64..400.0, -5.0_f64..20.0, -10.0_f64..1.0e7), 1..30)
    ) {
        let (mut tsp, mut tube) = models(Arc::new(DesignChemistry::default()));
        let mut last_tsp = (0.0, 0.0);
        let mut last_tube = (0.0, 0.0);
        for (temp, velocity, dt) in steps {
            tsp.update(temp, velocity, dt);
            tube.update(temp, velocity, dt);

            let now_tsp = (tsp.fouling_fraction(), tsp.thickness_mm());
            let now_tube = (tube.fouling_fraction(), tube.thickness_mm());
            prop_assert!(now_tsp.0 >= last_tsp.0 && now_tsp.1 >= last_tsp.1);
            prop_assert!(now_tube.0 >= last_tube.0 && now_tube.1 >= last_tube.1);
            prop_assert!((0.0..=1.0).contains(&now_tsp.0));
            prop_assert!((0.0..=1.0).contains(&now_tube.0));

            let capacity = tsp.flow_capacity();
            prop_assert!(capacity > 0.0 && capacity <= 1.0);
            let restriction = tube.primary_flow_restriction(0.0191, 3.0);
            prop_assert!(restriction.flow_capacity > 0.0 && restriction.flow_capacity <= 1.0);

            last_tsp = now_tsp;
            last_tube = now_tube;
        }
    }

    #[test]
    fn cleaning_only_shrinks(seed in 0.0_f64..6.0, action in prop::sample::select(vec![
        "chemical_cleaning", "mechanical_cleaning", "secondary_side_cleaning", "tsp_inspection",
    ])) {
        let (mut tsp, _) = models(Arc::new(DesignChemistry::default()));
        tsp.seed_deposits(seed);
        let before = tsp.thickness_mm();
        let result = tsp.perform_maintenance(action, &MaintenanceArgs::default());
        prop_assert!(result.success);
        prop_assert!(tsp.thickness_mm() <= before);
        prop_assert!((0.0..=1.0).contains(&result.effectiveness_score));
    }
}
