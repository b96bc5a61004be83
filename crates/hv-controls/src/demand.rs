//! Demand derivation: controller commands to instantaneous physical demand.
//!
//! These are the targets the actuators in [`crate::actuator`] track.

use hv_core::air;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

fn percent(pos: f64) -> f64 {
    pos.clamp(0.0, 100.0) / 100.0
}

/// Airflow demand for one side (supply or extract) of the air-handling unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowDemand {
    /// m³/h at 100 % fan position.
    pub rated_flow: f64,
    /// m³/h for fan steps 1, 2, ... in order.
    pub levels: Vec<f64>,
}

impl FlowDemand {
    pub fn new(rated_flow: f64, levels: Vec<f64>) -> ControlResult<Self> {
        if !(rated_flow.is_finite() && rated_flow > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "rated_flow must be positive",
            });
        }
        if levels.iter().any(|l| !(l.is_finite() && *l >= 0.0)) {
            return Err(ControlError::InvalidArg {
                what: "fan levels must be non-negative",
            });
        }
        Ok(Self { rated_flow, levels })
    }

    /// Flow for a discrete fan step. Step 0 (or below) stops the fan, steps
    /// beyond the table run at the highest level.
    pub fn level_for_step(&self, step: f64) -> f64 {
        let step = step.round();
        if step < 1.0 {
            return 0.0;
        }
        let index = (step as usize - 1).min(self.levels.len().saturating_sub(1));
        self.levels.get(index).copied().unwrap_or(self.rated_flow)
    }

    /// Demand in m³/h. The damper gates everything; a fan position wins over
    /// a fan step; with neither the fan runs at rated flow.
    pub fn demand(&self, damper: bool, position: Option<f64>, step: Option<f64>) -> f64 {
        if !damper {
            return 0.0;
        }
        match (position, step) {
            (Some(pos), _) => self.rated_flow * percent(pos),
            (None, Some(step)) => self.level_for_step(step),
            (None, None) => self.rated_flow,
        }
    }
}

/// Heating or cooling coil power demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoilDemand {
    /// kW at 100 % valve position.
    pub max_kw: f64,
}

impl CoilDemand {
    pub fn new(max_kw: f64) -> ControlResult<Self> {
        if !(max_kw.is_finite() && max_kw >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "coil max_kw must be non-negative",
            });
        }
        Ok(Self { max_kw })
    }

    /// Demand in kW. An explicit `false` gate (pump off, cooling disabled)
    /// zeroes the demand; an absent gate leaves it ungated.
    pub fn demand(&self, gate: Option<bool>, position: f64) -> f64 {
        match gate {
            Some(false) => 0.0,
            _ => self.max_kw * percent(position),
        }
    }
}

/// Heat-recovery power demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecoveryDemand {
    /// Temperature efficiency of the exchanger, 0..1.
    pub efficiency: f64,
    /// No recovery while outdoor and extract differ by at most this, °C.
    pub deadband_c: f64,
}

impl Default for RecoveryDemand {
    fn default() -> Self {
        Self {
            efficiency: 0.7,
            deadband_c: 2.0,
        }
    }
}

impl RecoveryDemand {
    pub fn new(efficiency: f64, deadband_c: f64) -> ControlResult<Self> {
        if !(0.0..=1.0).contains(&efficiency) {
            return Err(ControlError::InvalidArg {
                what: "recovery efficiency must be within 0..1",
            });
        }
        if !(deadband_c.is_finite() && deadband_c >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "recovery deadband must be non-negative",
            });
        }
        Ok(Self {
            efficiency,
            deadband_c,
        })
    }

    /// Demand in kW, positive when heat is delivered to the supply air.
    pub fn demand(&self, t_out: f64, t_extract: f64, flow_su: f64, position: f64) -> f64 {
        let delta = t_extract - t_out;
        if delta.abs() <= self.deadband_c || flow_su <= 0.0 {
            return 0.0;
        }
        self.efficiency * delta * air::capacity_rate_kw_per_k(flow_su) * percent(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply() -> FlowDemand {
        FlowDemand::new(2400.0, vec![1600.0, 2400.0]).unwrap()
    }

    #[test]
    fn closed_damper_means_no_flow() {
        assert_eq!(supply().demand(false, Some(80.0), Some(2.0)), 0.0);
    }

    #[test]
    fn position_then_step_then_rated() {
        let f = supply();
        assert_eq!(f.demand(true, Some(50.0), Some(1.0)), 1200.0);
        assert_eq!(f.demand(true, None, Some(1.0)), 1600.0);
        assert_eq!(f.demand(true, None, None), 2400.0);
    }

    #[test]
    fn step_table_edges() {
        let f = supply();
        assert_eq!(f.level_for_step(0.0), 0.0);
        assert_eq!(f.level_for_step(-1.0), 0.0);
        assert_eq!(f.level_for_step(2.0), 2400.0);
        assert_eq!(f.level_for_step(7.0), 2400.0);
        let bare = FlowDemand::new(1800.0, vec![]).unwrap();
        assert_eq!(bare.level_for_step(1.0), 1800.0);
    }

    #[test]
    fn coil_gating() {
        let htg = CoilDemand::new(30.0).unwrap();
        assert_eq!(htg.demand(Some(true), 50.0), 15.0);
        assert_eq!(htg.demand(None, 50.0), 15.0);
        assert_eq!(htg.demand(Some(false), 50.0), 0.0);
        assert_eq!(htg.demand(Some(true), 140.0), 30.0);
    }

    #[test]
    fn recovery_deadband() {
        let r = RecoveryDemand::default();
        assert_eq!(r.demand(19.0, 20.5, 2400.0, 100.0), 0.0);
        assert_eq!(r.demand(22.0, 20.0, 2400.0, 100.0), 0.0);
    }

    #[test]
    fn recovery_heats_in_winter_cools_in_summer() {
        let r = RecoveryDemand::new(0.5, 2.0).unwrap();
        // 3600 m³/h -> 1.206 kW/K
        let winter = r.demand(0.0, 20.0, 3600.0, 100.0);
        assert!((winter - 0.5 * 20.0 * 1.206).abs() < 1e-9);
        let summer = r.demand(30.0, 22.0, 3600.0, 50.0);
        assert!(summer < 0.0);
        assert_eq!(r.demand(0.0, 20.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn invalid_parameters() {
        assert!(FlowDemand::new(0.0, vec![]).is_err());
        assert!(FlowDemand::new(100.0, vec![-1.0]).is_err());
        assert!(CoilDemand::new(f64::NAN).is_err());
        assert!(RecoveryDemand::new(1.5, 2.0).is_err());
    }
}
