//! Outdoor-condition estimation for the plant emulator.
//!
//! External feeds are sparse and late: weather forecasts arrive in 6-hour
//! slots and particulate measurements are hourly, with the current hour often
//! unpublished. This crate turns both into a continuous "right now" signal.
//!
//! - [`forecast`]: slot-aligned linear interpolation of forecast series
//! - [`dust`]: forward extrapolation of delayed hourly PM10 readings
//! - [`estimator`]: owns the series, applies refreshes, reports freshness
//! - [`source`]: the fetch seams plus offline replay implementations
//!
//! Nothing here returns an error at estimation time. Missing or stale data
//! degrades to the best available number and is tagged with a [`Freshness`].

pub mod dust;
pub mod error;
pub mod estimator;
pub mod forecast;
pub mod source;

pub use dust::DustSeries;
pub use error::{AmbientError, AmbientResult, FetchError};
pub use estimator::{AmbientEstimator, AmbientFreshness, AmbientReport, OutdoorConditions};
pub use forecast::{Estimate, ForecastQuantity, ForecastSeries, Freshness, SlotPosition};
pub use source::{DustSource, ForecastSource, RawSeries, ReplayDust, ReplayForecast};
