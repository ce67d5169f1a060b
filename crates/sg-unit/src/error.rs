//! Error types for steam generator construction.

use sg_core::SgError;
use sg_fouling::FoulingError;
use thiserror::Error;

/// Errors detected while building a unit. The step path never errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Fouling model error: {message}")]
    Fouling { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<FoulingError> for SimError {
    fn from(e: FoulingError) -> Self {
        SimError::Fouling {
            message: e.to_string(),
        }
    }
}

impl From<SgError> for SimError {
    fn from(e: SgError) -> Self {
        match e {
            SgError::InvalidArg { what } => SimError::InvalidArg { what },
            SgError::NonFinite { what, .. } => SimError::InvalidArg { what },
            SgError::OutOfRange { what, .. } => SimError::InvalidArg { what },
        }
    }
}
