//! Error types for simulation setup.

use thiserror::Error;

/// Errors raised while assembling the plant. Stepping itself never fails.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown snapshot key: {key}")]
    UnknownKey { key: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hv_building::BuildingError> for SimError {
    fn from(e: hv_building::BuildingError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<hv_controls::ControlError> for SimError {
    fn from(e: hv_controls::ControlError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<hv_core::CoreError> for SimError {
    fn from(e: hv_core::CoreError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
