//! Wall-clock driven step trigger.
//!
//! The scheduler polls whole elapsed seconds and fires when they cross a
//! multiple of the step period. Elapsed time is offset by the run time
//! recovered from the last snapshot, so a restarted process continues its
//! horizon instead of starting over.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{SimError, SimResult};

/// Periodic trigger on whole seconds.
///
/// Fires once when `total_s` reaches the next multiple of the period. A poll
/// that skips past a multiple fires on the next poll, and never more than
/// once for that crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period_s: u64,
    next_due: u64,
}

impl Cadence {
    /// First due at the multiple strictly after `start_s`.
    pub fn new(period_s: u64, start_s: u64) -> Self {
        let period_s = period_s.max(1);
        Self {
            period_s,
            next_due: (start_s / period_s + 1) * period_s,
        }
    }

    /// Due immediately at `start_s`, then on multiples.
    pub fn immediate(period_s: u64, start_s: u64) -> Self {
        Self {
            period_s: period_s.max(1),
            next_due: start_s,
        }
    }

    pub fn period_s(&self) -> u64 {
        self.period_s
    }

    pub fn due(&mut self, total_s: u64) -> bool {
        if total_s < self.next_due {
            return false;
        }
        self.next_due = (total_s / self.period_s + 1) * self.period_s;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Waiting,
    Stepping,
}

/// One fired step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Run time including the recovered offset, s.
    pub total_seconds: u64,
    pub hours: u64,
    pub second_of_hour: u64,
    /// Wall-clock time since the previous tick, h.
    pub dt_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    pub step_period_s: u64,
    pub poll_interval_ms: u64,
    pub horizon_hours: u64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            step_period_s: 3,
            poll_interval_ms: 100,
            horizon_hours: 168,
        }
    }
}

pub struct Scheduler {
    clock: Box<dyn Clock>,
    opts: SchedulerOptions,
    offset_s: u64,
    timer: Cadence,
    last_tick_elapsed: f64,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(clock: Box<dyn Clock>, opts: SchedulerOptions, offset_s: u64) -> SimResult<Self> {
        if opts.step_period_s == 0 {
            return Err(SimError::InvalidArg {
                what: "step_period_s must be positive",
            });
        }
        if opts.poll_interval_ms == 0 || opts.poll_interval_ms >= 1000 {
            return Err(SimError::InvalidArg {
                what: "poll_interval_ms must be within 1..1000",
            });
        }
        let last_tick_elapsed = clock.elapsed_seconds();
        Ok(Self {
            timer: Cadence::new(opts.step_period_s, offset_s),
            clock,
            opts,
            offset_s,
            last_tick_elapsed,
            state: SchedulerState::Idle,
        })
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.opts
    }

    /// Whole seconds of run time, including the recovered offset.
    pub fn total_seconds(&self) -> u64 {
        self.offset_s + self.clock.elapsed_seconds().max(0.0).floor() as u64
    }

    pub fn horizon_reached(&self) -> bool {
        self.total_seconds() >= self.opts.horizon_hours * 3600
    }

    /// Non-blocking check for a due step.
    pub fn poll(&mut self) -> Option<Tick> {
        let elapsed = self.clock.elapsed_seconds();
        let total = self.total_seconds();
        if !self.timer.due(total) {
            return None;
        }
        let dt_hours = ((elapsed - self.last_tick_elapsed) / 3600.0).max(0.0);
        self.last_tick_elapsed = elapsed;
        Some(Tick {
            total_seconds: total,
            hours: total / 3600,
            second_of_hour: total % 3600,
            dt_hours,
        })
    }

    /// Sleep-poll until the next step is due. `None` once the horizon is reached.
    pub fn wait_for_tick(&mut self) -> Option<Tick> {
        self.state = SchedulerState::Waiting;
        let interval = Duration::from_millis(self.opts.poll_interval_ms);
        loop {
            if self.horizon_reached() {
                info!(total_seconds = self.total_seconds(), "horizon reached");
                self.state = SchedulerState::Idle;
                return None;
            }
            if let Some(tick) = self.poll() {
                debug!(hours = tick.hours, second = tick.second_of_hour, "tick");
                self.state = SchedulerState::Stepping;
                return Some(tick);
            }
            self.clock.sleep(interval);
        }
    }

    /// Mark the current step as done.
    pub fn finish_step(&mut self) {
        self.state = SchedulerState::Idle;
    }
}
