//! Time sources for the scheduler.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

/// Elapsed process time plus local wall-clock time.
pub trait Clock {
    /// Seconds since the clock was started.
    fn elapsed_seconds(&self) -> f64;

    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Block for `duration`. The scheduler's only suspension point.
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    started: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock. Sleeping advances time instantly; clones share the same
/// time so a test can hold a handle while the runner owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: NaiveDateTime,
    elapsed: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            elapsed: Rc::new(Cell::new(0.0)),
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.elapsed.set(self.elapsed.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed_seconds(&self) -> f64 {
        self.elapsed.get()
    }

    fn now(&self) -> NaiveDateTime {
        let millis = (self.elapsed.get() * 1000.0) as i64;
        self.start + chrono::Duration::milliseconds(millis)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn manual_clock_shares_time() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();
        clock.sleep(Duration::from_millis(1500));
        handle.advance(60.0);
        assert!((clock.elapsed_seconds() - 61.5).abs() < 1e-9);
        assert_eq!(clock.now(), start + chrono::Duration::milliseconds(61_500));
    }
}
