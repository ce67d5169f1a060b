//! sg-core: shared foundation for the steam generator workspace.
//!
//! Contains:
//! - units (uom conversions between the engineering units the models use)
//! - numeric (Real + tolerances + clipping helpers)
//! - state_map (flat numeric maps for reports and snapshots)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod state_map;
pub mod units;

pub use error::{SgError, SgResult};
pub use numeric::*;
pub use state_map::{StateMap, flag, merge_prefixed, put};
pub use units::*;
