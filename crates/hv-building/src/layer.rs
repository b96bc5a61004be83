//! Lumped thermal layers.

use serde::{Deserialize, Serialize};

use crate::error::{BuildingResult, positive};

/// First-order update of one layer toward a weighted mean of its drive and
/// neighbour temperatures.
///
/// `T + ((avg·coeff·T_drive + T_neighbor) / (avg·coeff + 1) − T) · dt/tau`
///
/// The `dt/tau` fraction is capped at 1 so an overly long step lands on the
/// target instead of overshooting it.
#[inline]
pub fn relax(
    t_prev: f64,
    t_drive: f64,
    t_neighbor: f64,
    avg: f64,
    coeff: f64,
    tau_h: f64,
    dt_h: f64,
) -> f64 {
    let weight = avg * coeff;
    let target = (weight * t_drive + t_neighbor) / (weight + 1.0);
    let fraction = (dt_h / tau_h).clamp(0.0, 1.0);
    t_prev + (target - t_prev) * fraction
}

/// Averaging weight and time constant of one layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerParams {
    /// Weight of the drive temperature against the neighbour.
    pub avg: f64,
    /// Time constant, hours.
    pub tau_h: f64,
}

impl LayerParams {
    pub const fn new(avg: f64, tau_h: f64) -> Self {
        Self { avg, tau_h }
    }

    pub fn validate(&self, avg_what: &'static str, tau_what: &'static str) -> BuildingResult<()> {
        positive(self.avg, avg_what)?;
        positive(self.tau_h, tau_what)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_step_moves_slightly() {
        let next = relax(15.0, 25.0, 12.0, 1.0, 1.0, 1.0, 1.0 / 3600.0);
        assert!(next > 15.0 && next < 25.0);
        assert!(next - 15.0 < 25.0 - next);
        // target 18.5
        assert!((next - (15.0 + 3.5 / 3600.0)).abs() < 1e-12);
    }

    #[test]
    fn zero_step_is_identity() {
        assert_eq!(relax(15.0, 25.0, 12.0, 2.0, 0.3, 4.0, 0.0), 15.0);
    }

    #[test]
    fn long_step_lands_on_target() {
        let next = relax(15.0, 25.0, 12.0, 1.0, 1.0, 1.0, 10.0);
        assert!((next - 18.5).abs() < 1e-12);
    }

    #[test]
    fn weaker_coupling_pulls_toward_neighbour() {
        let strong = relax(20.0, 30.0, 10.0, 1.0, 1.0, 1.0, 1.0);
        let weak = relax(20.0, 30.0, 10.0, 1.0, 0.3, 1.0, 1.0);
        assert!(weak < strong);
    }
}
