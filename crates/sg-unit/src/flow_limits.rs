//! Flow clamping against fouling-derived capacities, and pump energy.

use serde::Serialize;
use sg_core::clip;

/// Requested flow clamped to a capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClampedFlow {
    pub requested: f64,
    pub actual: f64,
    /// `actual / requested`, 1 when nothing was requested.
    pub factor: f64,
}

impl ClampedFlow {
    /// Clamp `requested` to `design · capacity`.
    pub fn new(requested: f64, design: f64, capacity: f64) -> Self {
        let requested = requested.max(0.0);
        let max = design.max(0.0) * clip(capacity, f64::MIN_POSITIVE, 1.0);
        let actual = requested.min(max);
        let factor = if requested > 0.0 {
            clip(actual / requested, f64::MIN_POSITIVE, 1.0)
        } else {
            1.0
        };
        Self {
            requested,
            actual,
            factor,
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.actual < self.requested
    }
}

/// Secondary flows limited by TSP blockage.
///
/// Steam and feedwater share one capacity derived from the TSP
/// pressure-drop ratio; the reported factor follows steam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SecondaryFlowLimit {
    pub steam: ClampedFlow,
    pub feedwater: ClampedFlow,
}

impl SecondaryFlowLimit {
    /// # Arguments
    /// * `steam`, `feedwater` - Requested flows (kg/s)
    /// * `design_steam`, `design_feedwater` - Design flows (kg/s)
    /// * `tsp_pressure_drop_ratio` - TSP pressure-drop ratio (≥ 1)
    pub fn new(
        steam: f64,
        feedwater: f64,
        design_steam: f64,
        design_feedwater: f64,
        tsp_pressure_drop_ratio: f64,
    ) -> Self {
        let capacity = 1.0 / tsp_pressure_drop_ratio.max(1.0).sqrt();
        Self {
            steam: ClampedFlow::new(steam, design_steam, capacity),
            feedwater: ClampedFlow::new(feedwater, design_feedwater, capacity),
        }
    }

    pub fn factor(&self) -> f64 {
        self.steam.factor
    }
}

/// Primary pump power with the TSP fouling penalty (MW).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PumpEnergy {
    pub base_mw: f64,
    pub fouling_penalty_mw: f64,
    pub total_mw: f64,
}

impl PumpEnergy {
    /// Half of the extra pressure drop shows up as extra pump power.
    pub fn new(base_mw: f64, tsp_pressure_drop_ratio: f64) -> Self {
        let fouling_penalty_mw = base_mw * (tsp_pressure_drop_ratio - 1.0).max(0.0) * 0.5;
        Self {
            base_mw,
            fouling_penalty_mw,
            total_mw: base_mw + fouling_penalty_mw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_plates_pass_design_flow() {
        let limit = SecondaryFlowLimit::new(555.0, 555.0, 555.0, 555.0, 1.0);
        assert_eq!(limit.steam.actual, 555.0);
        assert_eq!(limit.factor(), 1.0);
        assert!(!limit.steam.is_restricted());
    }

    #[test]
    fn fouled_plates_restrict_flow() {
        let limit = SecondaryFlowLimit::new(555.0, 600.0, 555.0, 555.0, 4.0);
        assert!((limit.steam.actual - 277.5).abs() < 1e-9);
        assert!((limit.feedwater.actual - 277.5).abs() < 1e-9);
        assert!((limit.factor() - 0.5).abs() < 1e-12);
        assert!(limit.feedwater.is_restricted());
    }

    #[test]
    fn zero_request_reports_unit_factor() {
        let flow = ClampedFlow::new(0.0, 5700.0, 0.5);
        assert_eq!(flow.actual, 0.0);
        assert_eq!(flow.factor, 1.0);
    }

    #[test]
    fn pump_penalty() {
        let clean = PumpEnergy::new(5.0, 1.0);
        assert_eq!(clean.total_mw, 5.0);
        let fouled = PumpEnergy::new(5.0, 3.0);
        assert_eq!(fouled.fouling_penalty_mw, 5.0);
        assert_eq!(fouled.total_mw, 10.0);
    }

    proptest! {
        #[test]
        fn factor_in_unit_interval(
            requested in 0.0f64..20000.0,
            design in 1.0f64..10000.0,
            capacity in 0.0f64..1.5,
        ) {
            let flow = ClampedFlow::new(requested, design, capacity);
            prop_assert!(flow.factor > 0.0 && flow.factor <= 1.0);
            prop_assert!(flow.actual <= flow.requested);
        }
    }
}
