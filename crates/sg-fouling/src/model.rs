//! Common interface of the fouling models.

use crate::kernel::FoulingClock;
use crate::maintenance::{MaintenanceArgs, MaintenanceHistory, MaintenanceResult};
use sg_core::StateMap;

/// A deposit process that grows with operating time and shrinks only
/// through maintenance.
pub trait FoulingModel {
    /// Short name used in logs and maintenance diagnostics.
    fn name(&self) -> &'static str;

    /// Normalized fouling in [0, 1].
    fn fouling_fraction(&self) -> f64;

    /// Representative deposit thickness (mm).
    fn thickness_mm(&self) -> f64;

    fn clock(&self) -> &FoulingClock;

    fn history(&self) -> &MaintenanceHistory;

    /// Action names accepted by [`FoulingModel::perform_maintenance`].
    fn supported_actions(&self) -> &'static [&'static str];

    /// Run a named maintenance action. Unknown names return a failure
    /// result and leave the model untouched.
    fn perform_maintenance(&mut self, action: &str, args: &MaintenanceArgs) -> MaintenanceResult;

    /// Flat diagnostic map, keys without a model prefix.
    fn state_map(&self) -> StateMap;

    /// Return to a clean, zero-time state.
    fn reset(&mut self);
}
