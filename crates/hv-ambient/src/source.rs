//! Feed seams and offline replay implementations.
//!
//! Live feeds (weather model API, air-quality API) live outside this
//! repository and implement [`ForecastSource`] / [`DustSource`]. The replay
//! sources read the same `{"times": [...], "data": [...]}` payload from disk.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dust::DustSeries;
use crate::error::FetchError;
use crate::forecast::{ForecastQuantity, ForecastSeries};

/// Wire payload shared by both feeds. Dust values may be `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSeries {
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub data: Vec<Option<f64>>,
}

impl RawSeries {
    pub fn into_forecast(self) -> Result<ForecastSeries, FetchError> {
        let values: Vec<f64> = self.data.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Ok(ForecastSeries::from_parts(&self.times, &values)?)
    }

    pub fn into_dust(self) -> DustSeries {
        DustSeries::new(self.times, self.data)
    }
}

pub trait ForecastSource {
    fn fetch_forecast(&mut self, quantity: ForecastQuantity) -> Result<ForecastSeries, FetchError>;
}

pub trait DustSource {
    fn fetch_dust(&mut self) -> Result<DustSeries, FetchError>;
}

fn read_raw(path: &Path) -> Result<RawSeries, FetchError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Reads `<dir>/<quantity>.json` on every fetch.
#[derive(Debug, Clone)]
pub struct ReplayForecast {
    dir: PathBuf,
}

impl ReplayForecast {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, quantity: ForecastQuantity) -> PathBuf {
        self.dir.join(format!("{}.json", quantity.as_str()))
    }
}

impl ForecastSource for ReplayForecast {
    fn fetch_forecast(&mut self, quantity: ForecastQuantity) -> Result<ForecastSeries, FetchError> {
        read_raw(&self.path_for(quantity))?.into_forecast()
    }
}

/// Reads one dust payload file on every fetch.
#[derive(Debug, Clone)]
pub struct ReplayDust {
    path: PathBuf,
}

impl ReplayDust {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DustSource for ReplayDust {
    fn fetch_dust(&mut self) -> Result<DustSeries, FetchError> {
        Ok(read_raw(&self.path)?.into_dust())
    }
}
