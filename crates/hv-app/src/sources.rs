//! Offline feed and controller wiring.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hv_ambient::{
    DustSeries, DustSource, FetchError, ForecastQuantity, ForecastSeries, ForecastSource,
    ReplayDust, ReplayForecast,
};
use hv_controls::{ControlReadings, ControlSignal, LoopbackController};
use hv_project::schema::{InitialValue, SourcesDef};

use crate::error::{AppError, AppResult};

/// Feed used when no replay file is configured. Every fetch fails, so the
/// estimator reports the quantity as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unfed;

impl ForecastSource for Unfed {
    fn fetch_forecast(&mut self, quantity: ForecastQuantity) -> Result<ForecastSeries, FetchError> {
        Err(FetchError::Unavailable {
            what: format!("no {quantity} source configured"),
        })
    }
}

impl DustSource for Unfed {
    fn fetch_dust(&mut self) -> Result<DustSeries, FetchError> {
        Err(FetchError::Unavailable {
            what: "no dust source configured".to_string(),
        })
    }
}

/// Relative paths are taken from the configuration file's directory.
pub fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

pub struct OfflineSources {
    pub forecast: Box<dyn ForecastSource>,
    pub dust: Box<dyn DustSource>,
    pub controller: LoopbackController,
}

impl OfflineSources {
    pub fn from_config(def: &SourcesDef, base_dir: &Path) -> AppResult<Self> {
        let forecast: Box<dyn ForecastSource> = match &def.forecast_dir {
            Some(dir) => Box::new(ReplayForecast::new(resolve(base_dir, dir))),
            None => Box::new(Unfed),
        };
        let dust: Box<dyn DustSource> = match &def.dust_file {
            Some(file) => Box::new(ReplayDust::new(resolve(base_dir, file))),
            None => Box::new(Unfed),
        };
        let controller = match &def.controller_file {
            Some(file) => load_controller_table(&resolve(base_dir, file))?,
            None => LoopbackController::default(),
        };
        Ok(Self {
            forecast,
            dust,
            controller,
        })
    }
}

/// Parse a YAML map of signal names to values.
pub fn parse_controller_table(content: &str) -> AppResult<ControlReadings> {
    let raw: BTreeMap<String, InitialValue> = serde_yaml::from_str(content)
        .map_err(|e| AppError::Config(format!("controller table: {e}")))?;
    let mut table = ControlReadings::new();
    for (name, value) in raw {
        let signal: ControlSignal = name
            .parse()
            .map_err(|e| AppError::Config(format!("controller table: {e}")))?;
        match value {
            InitialValue::Bool(b) => table.insert(signal, b),
            InitialValue::Number(v) => table.insert(signal, v),
        }
    }
    Ok(table)
}

pub fn load_controller_table(path: &Path) -> AppResult<LoopbackController> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(LoopbackController::new(parse_controller_table(&content)?))
}
