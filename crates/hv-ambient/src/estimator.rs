//! Owner of the ambient series and producer of the current outdoor conditions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dust::DustSeries;
use crate::error::FetchError;
use crate::forecast::{Estimate, ForecastQuantity, ForecastSeries, Freshness};
use crate::source::{DustSource, ForecastSource};

/// Kelvin-to-Celsius offset used when none is configured.
pub const DEFAULT_KELVIN_OFFSET: f64 = 273.15;

/// Current outdoor conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OutdoorConditions {
    /// °C
    pub temperature: f64,
    /// mm/h
    pub precipitation: f64,
    /// W/m²
    pub solar: f64,
    /// µg/m³
    pub dust: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientFreshness {
    pub temperature: Freshness,
    pub precipitation: Freshness,
    pub solar: Freshness,
    pub dust: Freshness,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmbientReport {
    pub conditions: OutdoorConditions,
    pub freshness: AmbientFreshness,
}

impl AmbientReport {
    /// Names of sub-estimates that did not come from current data.
    pub fn degraded(&self) -> Vec<(&'static str, Freshness)> {
        [
            ("temperature", self.freshness.temperature),
            ("precipitation", self.freshness.precipitation),
            ("solar", self.freshness.solar),
            ("dust", self.freshness.dust),
        ]
        .into_iter()
        .filter(|(_, f)| !f.is_fresh())
        .collect()
    }
}

/// Holds the latest good series per quantity. Refreshes replace a series
/// wholesale; a failed refresh leaves the previous one in place.
#[derive(Debug, Clone)]
pub struct AmbientEstimator {
    kelvin_offset: f64,
    temperature: ForecastSeries,
    precipitation: ForecastSeries,
    solar: ForecastSeries,
    dust: DustSeries,
}

impl Default for AmbientEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_KELVIN_OFFSET)
    }
}

impl AmbientEstimator {
    pub fn new(kelvin_offset: f64) -> Self {
        Self {
            kelvin_offset,
            temperature: ForecastSeries::default(),
            precipitation: ForecastSeries::default(),
            solar: ForecastSeries::default(),
            dust: DustSeries::default(),
        }
    }

    pub fn series(&self, quantity: ForecastQuantity) -> &ForecastSeries {
        match quantity {
            ForecastQuantity::Temperature => &self.temperature,
            ForecastQuantity::Precipitation => &self.precipitation,
            ForecastQuantity::Solar => &self.solar,
        }
    }

    pub fn dust(&self) -> &DustSeries {
        &self.dust
    }

    /// Apply a fetch result. Returns `true` when the series was replaced.
    pub fn apply_forecast(
        &mut self,
        quantity: ForecastQuantity,
        fetched: Result<ForecastSeries, FetchError>,
    ) -> bool {
        match fetched {
            Ok(series) => {
                debug!(%quantity, samples = series.len(), "forecast replaced");
                *self.series_mut(quantity) = series;
                true
            }
            Err(err) => {
                warn!(%quantity, error = %err, "forecast refresh failed, keeping previous series");
                false
            }
        }
    }

    pub fn apply_dust(&mut self, fetched: Result<DustSeries, FetchError>) -> bool {
        match fetched {
            Ok(series) => {
                debug!(readings = series.len(), "dust readings replaced");
                self.dust = series;
                true
            }
            Err(err) => {
                warn!(error = %err, "dust refresh failed, keeping previous readings");
                false
            }
        }
    }

    /// Fetch all forecast quantities. Returns how many were replaced.
    pub fn refresh_forecasts(&mut self, source: &mut dyn ForecastSource) -> usize {
        ForecastQuantity::ALL
            .into_iter()
            .filter(|&q| {
                let fetched = source.fetch_forecast(q);
                self.apply_forecast(q, fetched)
            })
            .count()
    }

    pub fn refresh_dust(&mut self, source: &mut dyn DustSource) -> bool {
        let fetched = source.fetch_dust();
        self.apply_dust(fetched)
    }

    /// Outdoor conditions at wall-clock `now`. Never fails.
    pub fn estimate(&self, now: NaiveDateTime) -> AmbientReport {
        let offset = self.kelvin_offset;
        let temperature = self
            .temperature
            .estimate_at(now)
            .map_present(|k| k - offset);
        let precipitation = self.precipitation.estimate_at(now);
        let solar = self.solar.estimate_at(now);
        let dust = self.dust.extrapolate(now);

        let pick = |e: Estimate| (e.value, e.freshness);
        let (t, tf) = pick(temperature);
        let (p, pf) = pick(precipitation);
        let (s, sf) = pick(solar);
        let (d, df) = pick(dust);

        AmbientReport {
            conditions: OutdoorConditions {
                temperature: t,
                precipitation: p.max(0.0),
                solar: s.max(0.0),
                dust: d,
            },
            freshness: AmbientFreshness {
                temperature: tf,
                precipitation: pf,
                solar: sf,
                dust: df,
            },
        }
    }

    fn series_mut(&mut self, quantity: ForecastQuantity) -> &mut ForecastSeries {
        match quantity {
            ForecastQuantity::Temperature => &mut self.temperature,
            ForecastQuantity::Precipitation => &mut self.precipitation,
            ForecastQuantity::Solar => &mut self.solar,
        }
    }
}
