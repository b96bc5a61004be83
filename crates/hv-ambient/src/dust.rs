//! Hourly particulate readings and forward extrapolation.
//!
//! The air-quality service only reports the past, hour by hour, newest first.
//! The current hour is often published late and shows up as `0.0` until then.
//! The estimate anchors on the newest non-zero reading among the last four and
//! extrapolates forward in time along the line through the anchor and the
//! reading one hour older:
//!
//! `value = anchor + (argument / 60) * (anchor - older)`
//!
//! where `argument` is minutes past the hour plus 60 per hour of anchor
//! staleness. Staleness is measured from the anchor's timestamp to the current
//! hour; readings without a parsable timestamp fall back to their list
//! position. The line is followed for at most [`ANCHOR_WINDOW`] hours past the
//! anchor and held flat after that.

use chrono::{NaiveDateTime, Timelike};

use crate::forecast::{Estimate, Freshness, parse_timestamp};

/// Number of most-recent readings searched for an anchor.
pub const ANCHOR_WINDOW: usize = 4;

const MAX_ARGUMENT_MINUTES: f64 = 60.0 * ANCHOR_WINDOW as f64;

/// Hourly PM10 readings, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DustSeries {
    times: Vec<String>,
    stamps: Vec<Option<NaiveDateTime>>,
    values: Vec<f64>,
}

impl DustSeries {
    /// Build from feed values; absent or non-finite readings become `0.0`.
    pub fn new(times: Vec<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect();
        let stamps = times.iter().map(|t| parse_timestamp(t)).collect();
        Self {
            times,
            stamps,
            values,
        }
    }

    pub fn from_values(values: &[f64]) -> Self {
        Self::new(Vec::new(), values.iter().copied().map(Some).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn times(&self) -> &[String] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whole hours between the reading at `index` and the hour containing `now`.
    fn hours_behind(&self, index: usize, now: NaiveDateTime) -> u32 {
        match self.stamps.get(index).copied().flatten() {
            Some(stamp) => {
                let hours = (hour_start(now) - hour_start(stamp)).num_hours();
                u32::try_from(hours.max(0)).unwrap_or(u32::MAX)
            }
            None => index as u32,
        }
    }

    /// Extrapolated concentration at wall-clock `now`.
    pub fn extrapolate(&self, now: NaiveDateTime) -> Estimate {
        let window = &self.values[..self.values.len().min(ANCHOR_WINDOW)];
        let Some(index) = window.iter().position(|&v| published(v)) else {
            return Estimate::missing();
        };
        let anchor = window[index];
        let stale_hours = self.hours_behind(index, now);
        let minutes = f64::from(now.minute()) + f64::from(now.second()) / 60.0;
        let argument = (minutes + 60.0 * f64::from(stale_hours)).min(MAX_ARGUMENT_MINUTES);

        let value = match self.values.get(index + 1).copied().filter(|&v| published(v)) {
            Some(older) => anchor + argument / 60.0 * (anchor - older),
            None => anchor,
        };

        Estimate {
            value: value.max(0.0),
            freshness: if stale_hours == 0 {
                Freshness::Fresh
            } else {
                Freshness::Stale { hours: stale_hours }
            },
        }
    }
}

fn hour_start(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t)
}

#[inline]
fn published(v: f64) -> bool {
    v.is_finite() && v > 0.0
}
