//! Error types for the hv-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("Runtime compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Controller error: {0}")]
    Controller(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hv-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<hv_project::ProjectError> for AppError {
    fn from(err: hv_project::ProjectError) -> Self {
        match err {
            hv_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<hv_sim::SimError> for AppError {
    fn from(err: hv_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<hv_building::BuildingError> for AppError {
    fn from(err: hv_building::BuildingError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<hv_controls::ControlError> for AppError {
    fn from(err: hv_controls::ControlError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<hv_controls::LinkError> for AppError {
    fn from(err: hv_controls::LinkError) -> Self {
        AppError::Controller(err.to_string())
    }
}

impl From<hv_results::ResultsError> for AppError {
    fn from(err: hv_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
