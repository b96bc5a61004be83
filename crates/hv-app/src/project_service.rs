//! Configuration loading and introspection.

use std::path::{Path, PathBuf};

use hv_project::schema::PlantConfig;

use crate::error::{AppError, AppResult};
use crate::runtime_compile::compile_step;

/// Summary of a configuration for listing.
#[derive(Debug, Clone)]
pub struct ConfigSummary {
    pub name: String,
    pub building_model: &'static str,
    pub step_period_s: u64,
    pub horizon_hours: u64,
    pub snapshot_path: String,
    pub forecast_fed: bool,
    pub dust_fed: bool,
    pub initial_overrides: usize,
}

/// Load and validate a YAML configuration.
pub fn load_config(path: &Path) -> AppResult<PlantConfig> {
    if !path.is_file() {
        return Err(AppError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "configuration not found"),
        });
    }
    Ok(hv_project::load_yaml(path)?)
}

/// Directory relative paths in `path` are resolved against.
pub fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Schema validation plus a trial compilation of every model.
pub fn check_config(config: &PlantConfig) -> AppResult<()> {
    hv_project::validate_config(config).map_err(|e| AppError::Validation(e.to_string()))?;
    compile_step(config)?;
    crate::runtime_compile::initial_snapshot(config)?;
    Ok(())
}

pub fn summarize(config: &PlantConfig) -> ConfigSummary {
    ConfigSummary {
        name: config.name.clone(),
        building_model: config.building.model_name(),
        step_period_s: config.timing.step_period_s,
        horizon_hours: config.timing.horizon_hours,
        snapshot_path: config.storage.snapshot_path.clone(),
        forecast_fed: config.sources.forecast_dir.is_some(),
        dust_fed: config.sources.dust_file.is_some(),
        initial_overrides: config.initial.len(),
    }
}
