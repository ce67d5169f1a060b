//! Boundary conditions for one step and their sanitation.

use crate::report::{Diagnostic, DiagnosticKind};
use crate::state::SteamGeneratorState;
use serde::{Deserialize, Serialize};
use sg_chemistry::ChemistryUpdate;

/// Elapsed time substituted for a non-positive or non-finite step (s).
pub const MIN_TIME_STEP_S: f64 = 1.0e-3;

/// Boundary conditions supplied by the plant for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepInputs {
    /// Primary inlet temperature (°C).
    pub primary_inlet_temp_c: f64,
    /// Primary outlet temperature (°C).
    pub primary_outlet_temp_c: f64,
    /// Primary flow (kg/s).
    pub primary_flow: f64,
    /// Requested steam flow out (kg/s).
    pub steam_flow: f64,
    /// Requested feedwater flow in (kg/s).
    pub feedwater_flow: f64,
    /// Feedwater temperature (°C).
    pub feedwater_temp_c: f64,
    /// Elapsed time (s).
    pub dt_s: f64,
    /// Forwarded verbatim to the chemistry provider before fouling advances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chemistry_update: Option<ChemistryUpdate>,
}

impl Default for StepInputs {
    fn default() -> Self {
        Self {
            primary_inlet_temp_c: 327.0,
            primary_outlet_temp_c: 293.0,
            primary_flow: 5700.0,
            steam_flow: 555.0,
            feedwater_flow: 555.0,
            feedwater_temp_c: 227.0,
            dt_s: 1.0,
            chemistry_update: None,
        }
    }
}

impl StepInputs {
    /// Replace unusable values so the step can always proceed.
    ///
    /// Non-finite temperatures fall back to `prior`, non-finite flows to
    /// zero, negative flows clip to zero, a bad `dt_s` becomes
    /// [`MIN_TIME_STEP_S`] and a step longer than `max_dt_s` is cut to it.
    /// Each substitution is recorded in `diagnostics`.
    pub fn sanitized(
        &self,
        prior: &SteamGeneratorState,
        max_dt_s: f64,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> StepInputs {
        let mut temperature = |value: f64, fallback: f64, what: &'static str| {
            if value.is_finite() {
                value
            } else {
                diagnostics.push(Diagnostic::new(DiagnosticKind::NonFiniteInput, what, value));
                fallback
            }
        };
        let primary_inlet_temp_c = temperature(
            self.primary_inlet_temp_c,
            prior.primary_inlet_temp_c,
            "primary_inlet_temp",
        );
        let primary_outlet_temp_c = temperature(
            self.primary_outlet_temp_c,
            prior.primary_outlet_temp_c,
            "primary_outlet_temp",
        );
        let feedwater_temp_c =
            temperature(self.feedwater_temp_c, prior.feedwater_temp_c, "feedwater_temp");

        let mut flow = |value: f64, what: &'static str| {
            if !value.is_finite() {
                diagnostics.push(Diagnostic::new(DiagnosticKind::NonFiniteInput, what, value));
                0.0
            } else if value < 0.0 {
                diagnostics.push(Diagnostic::new(DiagnosticKind::NegativeFlow, what, value));
                0.0
            } else {
                value
            }
        };
        let primary_flow = flow(self.primary_flow, "primary_flow");
        let steam_flow = flow(self.steam_flow, "steam_flow");
        let feedwater_flow = flow(self.feedwater_flow, "feedwater_flow");

        let dt_s = if !self.dt_s.is_finite() || self.dt_s <= 0.0 {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::InvalidTimeStep,
                "dt",
                self.dt_s,
            ));
            MIN_TIME_STEP_S
        } else if self.dt_s > max_dt_s {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::InvalidTimeStep,
                "dt_above_max",
                self.dt_s,
            ));
            max_dt_s
        } else {
            self.dt_s
        };

        StepInputs {
            primary_inlet_temp_c,
            primary_outlet_temp_c,
            primary_flow,
            steam_flow,
            feedwater_flow,
            feedwater_temp_c,
            dt_s,
            chemistry_update: self.chemistry_update.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SteamGeneratorConfig;

    const MAX_DT_S: f64 = 86_400.0;

    fn prior() -> SteamGeneratorState {
        SteamGeneratorState::design(&SteamGeneratorConfig::default())
    }

    #[test]
    fn clean_inputs_pass_through() {
        let mut diags = Vec::new();
        let inputs = StepInputs::default();
        assert_eq!(inputs.sanitized(&prior(), MAX_DT_S, &mut diags), inputs);
        assert!(diags.is_empty());
    }

    #[test]
    fn bad_values_are_substituted() {
        let mut diags = Vec::new();
        let inputs = StepInputs {
            primary_inlet_temp_c: f64::NAN,
            steam_flow: -10.0,
            feedwater_flow: f64::INFINITY,
            dt_s: 0.0,
            ..Default::default()
        };
        let clean = inputs.sanitized(&prior(), MAX_DT_S, &mut diags);
        assert_eq!(clean.primary_inlet_temp_c, 327.0);
        assert_eq!(clean.steam_flow, 0.0);
        assert_eq!(clean.feedwater_flow, 0.0);
        assert_eq!(clean.dt_s, MIN_TIME_STEP_S);

        let kinds: Vec<_> = diags.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::NonFiniteInput,
                DiagnosticKind::NegativeFlow,
                DiagnosticKind::NonFiniteInput,
                DiagnosticKind::InvalidTimeStep,
            ]
        );
    }

    #[test]
    fn long_steps_are_cut() {
        let mut diags = Vec::new();
        let inputs = StepInputs {
            dt_s: f64::MAX,
            ..Default::default()
        };
        let clean = inputs.sanitized(&prior(), MAX_DT_S, &mut diags);
        assert_eq!(clean.dt_s, MAX_DT_S);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidTimeStep);

        let mut diags = Vec::new();
        let inputs = StepInputs {
            dt_s: MAX_DT_S,
            ..Default::default()
        };
        assert_eq!(inputs.sanitized(&prior(), MAX_DT_S, &mut diags).dt_s, MAX_DT_S);
        assert!(diags.is_empty());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let inputs: StepInputs = serde_yaml::from_str("feedwater_flow: 0.0\ndt_s: 5.0\n").unwrap();
        assert_eq!(inputs.feedwater_flow, 0.0);
        assert_eq!(inputs.dt_s, 5.0);
        assert_eq!(inputs.primary_flow, 5700.0);
        assert!(inputs.chemistry_update.is_none());
    }
}
