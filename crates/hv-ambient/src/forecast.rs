//! Forecast series and slot interpolation.
//!
//! The weather model publishes values on a 6-hour grid (00, 06, 12, 18).
//! The current value is a straight line between the slot at or before "now"
//! and the following slot.

use chrono::{DateTime, Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AmbientError, AmbientResult};

/// Length of one forecast slot in minutes.
pub const SLOT_MINUTES: f64 = 360.0;
const SLOT_HOURS: u32 = 6;

/// Ambient quantity served by the forecast feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastQuantity {
    Temperature,
    Precipitation,
    Solar,
}

impl ForecastQuantity {
    pub const ALL: [ForecastQuantity; 3] = [
        ForecastQuantity::Temperature,
        ForecastQuantity::Precipitation,
        ForecastQuantity::Solar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Precipitation => "precipitation",
            Self::Solar => "solar",
        }
    }
}

impl fmt::Display for ForecastQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How current the data behind an estimate is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Freshness {
    #[default]
    Fresh,
    /// Built from data that lags "now" by this many whole hours.
    Stale { hours: u32 },
    /// No usable data; the value is a placeholder.
    Missing,
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// A value together with the freshness of the data it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub freshness: Freshness,
}

impl Estimate {
    pub fn fresh(value: f64) -> Self {
        Self {
            value,
            freshness: Freshness::Fresh,
        }
    }

    pub fn missing() -> Self {
        Self {
            value: 0.0,
            freshness: Freshness::Missing,
        }
    }

    /// Apply `f` to the value unless the estimate is a missing placeholder.
    pub fn map_present(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self.freshness {
            Freshness::Missing => self,
            _ => Self {
                value: f(self.value),
                ..self
            },
        }
    }
}

/// Position of a wall-clock instant within its forecast slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPosition {
    pub start: NaiveDateTime,
    /// Minutes since `start`, in `[0, 360)`.
    pub elapsed_minutes: f64,
}

impl SlotPosition {
    pub fn of(now: NaiveDateTime) -> Self {
        let slot_hour = now.hour() / SLOT_HOURS * SLOT_HOURS;
        let start = now
            .date()
            .and_hms_opt(slot_hour, 0, 0)
            .unwrap_or(now);
        let elapsed_minutes = (now - start).num_milliseconds() as f64 / 60_000.0;
        Self {
            start,
            elapsed_minutes,
        }
    }

    pub fn next_start(&self) -> NaiveDateTime {
        self.start + Duration::hours(i64::from(SLOT_HOURS))
    }
}

/// Linear interpolation across one slot. `elapsed_minutes = 0` gives `v0`,
/// `elapsed_minutes = 360` gives `v1`.
#[inline]
pub fn interpolate(v0: f64, v1: f64, elapsed_minutes: f64) -> f64 {
    v0 + elapsed_minutes / SLOT_MINUTES * (v1 - v0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: NaiveDateTime,
    pub value: f64,
}

/// Ordered forecast samples for one quantity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    samples: Vec<Sample>,
}

impl ForecastSeries {
    pub fn new(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.time);
        Self { samples }
    }

    /// Build a series from parallel timestamp/value lists as delivered by the feed.
    pub fn from_parts(times: &[String], values: &[f64]) -> AmbientResult<Self> {
        if times.len() != values.len() {
            return Err(AmbientError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        let mut samples = Vec::with_capacity(times.len());
        for (index, (time, &value)) in times.iter().zip(values).enumerate() {
            let time = parse_timestamp(time).ok_or_else(|| AmbientError::BadTimestamp {
                value: time.clone(),
            })?;
            if !value.is_finite() {
                return Err(AmbientError::NonFinite { index });
            }
            samples.push(Sample { time, value });
        }
        Ok(Self::new(samples))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    fn value_at(&self, time: NaiveDateTime) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.time == time)
            .map(|s| s.value)
    }

    /// Interpolated value at `now`.
    ///
    /// No sample at the current slot start gives a zero [`Freshness::Missing`]
    /// estimate. A slot without its successor holds the slot value and is
    /// reported stale.
    pub fn estimate_at(&self, now: NaiveDateTime) -> Estimate {
        let slot = SlotPosition::of(now);
        let Some(v0) = self.value_at(slot.start) else {
            return Estimate::missing();
        };
        match self.value_at(slot.next_start()) {
            Some(v1) => Estimate::fresh(interpolate(v0, v1, slot.elapsed_minutes)),
            None => Estimate {
                value: v0,
                freshness: Freshness::Stale {
                    hours: (slot.elapsed_minutes / 60.0) as u32,
                },
            },
        }
    }
}

/// Parse the timestamp formats seen from the feeds.
///
/// Offsets are discarded and the wall time is kept as written.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn series(points: &[(u32, f64)]) -> ForecastSeries {
        ForecastSeries::new(
            points
                .iter()
                .map(|&(h, value)| Sample {
                    time: at(h, 0),
                    value,
                })
                .collect(),
        )
    }

    #[test]
    fn slot_position_aligns_to_six_hours() {
        let pos = SlotPosition::of(at(14, 30));
        assert_eq!(pos.start, at(12, 0));
        assert!((pos.elapsed_minutes - 150.0).abs() < 1e-9);
        assert_eq!(pos.next_start(), at(18, 0));

        let pos = SlotPosition::of(at(5, 59));
        assert_eq!(pos.start, at(0, 0));
    }

    #[test]
    fn interpolation_exact_at_boundaries() {
        assert_eq!(interpolate(280.0, 286.0, 0.0), 280.0);
        assert_eq!(interpolate(280.0, 286.0, 360.0), 286.0);
        assert!((interpolate(280.0, 286.0, 180.0) - 283.0).abs() < 1e-12);
    }

    #[test]
    fn estimate_inside_slot() {
        let s = series(&[(6, 2.0), (12, 8.0), (18, 4.0)]);
        let e = s.estimate_at(at(9, 0));
        assert_eq!(e.freshness, Freshness::Fresh);
        assert!((e.value - 5.0).abs() < 1e-12);
        assert_eq!(s.estimate_at(at(12, 0)).value, 8.0);
    }

    #[test]
    fn missing_slot_is_zero_and_tagged() {
        let s = series(&[(0, 2.0), (6, 8.0)]);
        let e = s.estimate_at(at(13, 0));
        assert_eq!(e.value, 0.0);
        assert_eq!(e.freshness, Freshness::Missing);
        assert_eq!(ForecastSeries::default().estimate_at(at(1, 0)), Estimate::missing());
    }

    #[test]
    fn slot_without_successor_holds_value() {
        let s = series(&[(12, 8.0)]);
        let e = s.estimate_at(at(14, 10));
        assert_eq!(e.value, 8.0);
        assert_eq!(e.freshness, Freshness::Stale { hours: 2 });
    }

    #[test]
    fn from_parts_parses_feed_formats() {
        let times = vec![
            "2024-03-01T06:00:00".to_string(),
            "2024-03-01T12:00:00Z".to_string(),
            "2024-03-01 18:00".to_string(),
        ];
        let s = ForecastSeries::from_parts(&times, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.samples()[1].time, at(12, 0));
    }

    #[test]
    fn from_parts_rejects_bad_input() {
        let times = vec!["not a date".to_string()];
        assert!(matches!(
            ForecastSeries::from_parts(&times, &[1.0]),
            Err(AmbientError::BadTimestamp { .. })
        ));
        assert!(matches!(
            ForecastSeries::from_parts(&times, &[]),
            Err(AmbientError::LengthMismatch { .. })
        ));
    }
}
