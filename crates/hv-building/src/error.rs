//! Error types for building model configuration.

use thiserror::Error;

/// Errors raised while constructing a building model. Integration itself
/// never fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildingError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical parameter: {what} = {value}")]
    NonPhysical { what: &'static str, value: f64 },
}

pub type BuildingResult<T> = Result<T, BuildingError>;

/// Require a finite, strictly positive parameter.
pub(crate) fn positive(value: f64, what: &'static str) -> BuildingResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BuildingError::NonPhysical { what, value })
    }
}

/// Require a finite, non-negative parameter.
pub(crate) fn non_negative(value: f64, what: &'static str) -> BuildingResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(BuildingError::NonPhysical { what, value })
    }
}
