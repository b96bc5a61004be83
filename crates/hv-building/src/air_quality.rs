//! Room CO₂ concentration from occupancy and ventilation.
//!
//! `dC/dt = n·g/V·1e6 − ach·(C − C_out)` with `n` occupants each exhaling
//! `g` m³/h of CO₂ into a room of volume `V`, and `ach = flow/V` air changes
//! per hour. Integrated exactly over the step, so any step length is stable.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{BuildingError, BuildingResult, non_negative, positive};

/// Weekly occupancy window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancySchedule {
    /// ISO weekday numbers (Monday = 1) on which the room is occupied.
    pub weekdays: Vec<u32>,
    /// First occupied hour.
    pub start_hour: u32,
    /// First unoccupied hour after the window.
    pub end_hour: u32,
    pub occupants: f64,
}

impl Default for OccupancySchedule {
    fn default() -> Self {
        Self {
            weekdays: vec![1, 2, 3, 4, 5],
            start_hour: 8,
            end_hour: 18,
            occupants: 20.0,
        }
    }
}

impl OccupancySchedule {
    pub fn occupants_at(&self, now: NaiveDateTime) -> f64 {
        let day = now.weekday().number_from_monday();
        let hour = now.hour();
        if self.weekdays.contains(&day) && hour >= self.start_hour && hour < self.end_hour {
            self.occupants
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityParams {
    /// Outdoor CO₂ level, ppm.
    pub outdoor_ppm: f64,
    /// CO₂ exhaled per person, m³/h.
    pub generation_m3h: f64,
    pub room_volume_m3: f64,
    pub schedule: OccupancySchedule,
}

impl Default for AirQualityParams {
    fn default() -> Self {
        Self {
            outdoor_ppm: 420.0,
            generation_m3h: 0.018,
            room_volume_m3: 900.0,
            schedule: OccupancySchedule::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AirQualityModel {
    params: AirQualityParams,
}

impl AirQualityModel {
    pub fn new(params: AirQualityParams) -> BuildingResult<Self> {
        non_negative(params.outdoor_ppm, "air_quality.outdoor_ppm")?;
        non_negative(params.generation_m3h, "air_quality.generation_m3h")?;
        positive(params.room_volume_m3, "air_quality.room_volume_m3")?;
        non_negative(params.schedule.occupants, "air_quality.schedule.occupants")?;
        let s = &params.schedule;
        if s.start_hour > 24 || s.end_hour > 24 || s.weekdays.iter().any(|d| !(1..=7).contains(d)) {
            return Err(BuildingError::InvalidArg {
                what: "air_quality.schedule out of range",
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &AirQualityParams {
        &self.params
    }

    /// Concentration after `dt_h` hours with `occupants` people and
    /// `flow` m³/h of outdoor air.
    pub fn step(&self, ppm: f64, occupants: f64, flow: f64, dt_h: f64) -> f64 {
        let p = &self.params;
        let dt = non_negative_or_zero(dt_h);
        let source = non_negative_or_zero(occupants) * p.generation_m3h / p.room_volume_m3 * 1e6;
        let ach = non_negative_or_zero(flow) / p.room_volume_m3;
        if ach <= 0.0 {
            return ppm + source * dt;
        }
        let equilibrium = p.outdoor_ppm + source / ach;
        equilibrium + (ppm - equilibrium) * (-ach * dt).exp()
    }

    /// [`Self::step`] with occupancy taken from the schedule at `now`.
    pub fn step_at(&self, now: NaiveDateTime, ppm: f64, flow: f64, dt_h: f64) -> f64 {
        self.step(ppm, self.params.schedule.occupants_at(now), flow, dt_h)
    }
}

fn non_negative_or_zero(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
