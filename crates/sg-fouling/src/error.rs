//! Error types for fouling model construction.

use sg_core::SgError;
use thiserror::Error;

/// Errors raised while validating fouling configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FoulingError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

pub type FoulingResult<T> = Result<T, FoulingError>;

impl From<SgError> for FoulingError {
    fn from(e: SgError) -> Self {
        match e {
            SgError::InvalidArg { what } => FoulingError::InvalidArg { what },
            other => FoulingError::InvalidConfig {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_conversion() {
        let err: FoulingError = SgError::InvalidArg { what: "tsp_count" }.into();
        assert_eq!(err, FoulingError::InvalidArg { what: "tsp_count" });

        let err: FoulingError = SgError::NonFinite {
            what: "ph_optimal",
            value: f64::NAN,
        }
        .into();
        assert!(err.to_string().contains("ph_optimal"));
    }
}
