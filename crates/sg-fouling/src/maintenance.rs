//! Maintenance dispatch contract shared by the fouling models and the unit.
//!
//! A maintenance call never fails: unsupported actions come back as a
//! structured result with `success == false` so schedulers can probe.

use crate::kernel::FoulingClock;
use serde::{Deserialize, Serialize};
use sg_chemistry::ChemistryUpdate;
use std::collections::{BTreeMap, VecDeque};

/// Number of maintenance records retained per model.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningMethod {
    #[default]
    Chemical,
    Mechanical,
    Combined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiationExposure {
    #[default]
    None,
    Low,
    Moderate,
    High,
}

/// Optional arguments for a maintenance call. Absent values take each
/// action's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceArgs {
    pub cleaning_type: Option<CleaningMethod>,
    pub target_boric_acid_ppm: Option<f64>,
    pub target_lithium_ppm: Option<f64>,
    pub target_ph: Option<f64>,
    pub sample_size: Option<u32>,
    pub update: Option<ChemistryUpdate>,
}

impl MaintenanceArgs {
    pub fn with_cleaning(method: CleaningMethod) -> Self {
        Self {
            cleaning_type: Some(method),
            ..Default::default()
        }
    }
}

/// Outcome of one maintenance call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceResult {
    pub success: bool,
    pub duration_hours: f64,
    pub work_performed: String,
    pub findings: String,
    /// Always within [0, 1].
    pub effectiveness_score: f64,
    pub next_maintenance_due_hours: f64,
    pub parts_used: Vec<String>,
    pub recommendations: Vec<String>,
    pub radiation_exposure: RadiationExposure,
    /// Numeric measurements or removal amounts reported by the action.
    pub measurements: BTreeMap<String, f64>,
}

impl MaintenanceResult {
    /// Successful result with the effectiveness clipped into [0, 1].
    pub fn completed(
        work_performed: impl Into<String>,
        duration_hours: f64,
        effectiveness_score: f64,
        next_maintenance_due_hours: f64,
    ) -> Self {
        Self {
            success: true,
            duration_hours,
            work_performed: work_performed.into(),
            effectiveness_score: sg_core::clip(effectiveness_score, 0.0, 1.0),
            next_maintenance_due_hours,
            ..Default::default()
        }
    }

    /// Failure result for an action the target does not support.
    pub fn unsupported(action: &str, target: &str, supported: &[&str]) -> Self {
        Self {
            success: false,
            work_performed: String::new(),
            findings: format!(
                "Unknown {target} maintenance action '{action}'; supported: {}",
                supported.join(", ")
            ),
            ..Default::default()
        }
    }

    pub fn with_findings(mut self, findings: impl Into<String>) -> Self {
        self.findings = findings.into();
        self
    }

    pub fn with_parts(mut self, parts: &[&str]) -> Self {
        self.parts_used = parts.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_radiation(mut self, exposure: RadiationExposure) -> Self {
        self.radiation_exposure = exposure;
        self
    }

    pub fn measure(mut self, key: &str, value: f64) -> Self {
        self.measurements.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub action: String,
    pub operating_years: f64,
    pub success: bool,
    pub duration_hours: f64,
    pub effectiveness_score: f64,
}

/// Ring of the most recent maintenance records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceHistory {
    records: VecDeque<MaintenanceRecord>,
}

impl MaintenanceHistory {
    /// Record a successful call and reset the clock's since-cleaning time.
    /// Failed calls leave both untouched.
    pub fn record(&mut self, clock: &mut FoulingClock, action: &str, result: &MaintenanceResult) {
        if !result.success {
            return;
        }
        clock.mark_maintained();
        if self.records.len() == HISTORY_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(MaintenanceRecord {
            action: action.to_string(),
            operating_years: clock.operating_years,
            success: result.success,
            duration_hours: result.duration_hours,
            effectiveness_score: result.effectiveness_score,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&MaintenanceRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaintenanceRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
