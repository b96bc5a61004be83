//! Three-layer temperature chain: room, construction, insulation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BuildingResult, positive};
use crate::layer::{LayerParams, relax};
use crate::model::{BuildingState, DEFAULT_MAX_DT_HOURS, ThermalInputs, ThermalModel, clamp_dt};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleParams {
    pub room: LayerParams,
    pub construction: LayerParams,
    pub insulation: LayerParams,
    /// Drive coupling while the unit is not ventilating.
    pub unventilated_coeff: f64,
    pub max_dt_h: f64,
}

impl Default for SimpleParams {
    fn default() -> Self {
        Self {
            room: LayerParams::new(1.0, 1.0),
            construction: LayerParams::new(2.0, 36.0),
            insulation: LayerParams::new(4.0, 2.0),
            unventilated_coeff: 0.3,
            max_dt_h: DEFAULT_MAX_DT_HOURS,
        }
    }
}

/// Temperature-only building model.
///
/// Each layer relaxes toward a blend of the layer feeding it and its outer
/// neighbour:
///
/// - room: supply air, construction
/// - construction: room (new value), insulation
/// - insulation: construction (new value), outdoor
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleBuilding {
    params: SimpleParams,
}

impl SimpleBuilding {
    pub fn new(params: SimpleParams) -> BuildingResult<Self> {
        params.room.validate("room.avg", "room.tau_h")?;
        params
            .construction
            .validate("construction.avg", "construction.tau_h")?;
        params
            .insulation
            .validate("insulation.avg", "insulation.tau_h")?;
        positive(params.unventilated_coeff, "unventilated_coeff")?;
        positive(params.max_dt_h, "max_dt_h")?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SimpleParams {
        &self.params
    }
}

impl ThermalModel for SimpleBuilding {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn integrate(
        &self,
        prev: &BuildingState,
        inputs: &ThermalInputs,
        dt_hours: f64,
    ) -> BuildingState {
        let dt = clamp_dt(dt_hours, self.params.max_dt_h);
        let coeff = inputs.coupling(self.params.unventilated_coeff);
        let p = &self.params;

        let room = relax(
            prev.temp_rm,
            inputs.t_supply,
            prev.temp_wall,
            p.room.avg,
            coeff,
            p.room.tau_h,
            dt,
        );
        let wall = relax(
            prev.temp_wall,
            room,
            prev.temp_ins,
            p.construction.avg,
            coeff,
            p.construction.tau_h,
            dt,
        );
        let ins = relax(
            prev.temp_ins,
            wall,
            inputs.t_out,
            p.insulation.avg,
            coeff,
            p.insulation.tau_h,
            dt,
        );
        debug!(dt, coeff, room, wall, ins, "simple building step");

        BuildingState {
            temp_rm: room,
            temp_wall: wall,
            temp_ins: ins,
            temp_ex: room,
            ..prev.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state(rm: f64, wall: f64, ins: f64) -> BuildingState {
        BuildingState {
            temp_rm: rm,
            temp_wall: wall,
            temp_ins: ins,
            temp_ex: rm,
            ..BuildingState::default()
        }
    }

    fn ventilated(t_supply: f64, t_out: f64) -> ThermalInputs {
        ThermalInputs {
            t_out,
            t_supply,
            flow_su: 1800.0,
            damper: true,
            solar: 0.0,
        }
    }

    #[test]
    fn one_second_of_warm_supply() {
        let model = SimpleBuilding::new(SimpleParams::default()).unwrap();
        let next = model.integrate(&state(15.0, 12.0, 10.0), &ventilated(25.0, 0.0), 1.0 / 3600.0);
        assert!(next.temp_rm > 15.0 && next.temp_rm < 25.0);
        assert!(next.temp_rm - 15.0 < 25.0 - next.temp_rm);
        assert_eq!(next.temp_ex, next.temp_rm);
    }

    #[test]
    fn zero_and_negative_steps_hold_state() {
        let model = SimpleBuilding::new(SimpleParams::default()).unwrap();
        let prev = state(20.0, 18.0, 16.0);
        for dt in [0.0, -1.0, f64::NAN] {
            let next = model.integrate(&prev, &ventilated(30.0, -10.0), dt);
            assert_eq!(next.temperatures(), prev.temperatures());
        }
    }

    #[test]
    fn long_pause_is_clamped() {
        let model = SimpleBuilding::new(SimpleParams::default()).unwrap();
        let prev = state(20.0, 18.0, 16.0);
        let clamped = model.integrate(&prev, &ventilated(30.0, -10.0), 48.0);
        let max = model.integrate(&prev, &ventilated(30.0, -10.0), 0.25);
        assert_eq!(clamped, max);
    }

    #[test]
    fn unventilated_room_couples_weakly_to_supply() {
        let model = SimpleBuilding::new(SimpleParams::default()).unwrap();
        let prev = state(15.0, 15.0, 15.0);
        let on = model.integrate(&prev, &ventilated(30.0, 15.0), 0.1);
        let off = model.integrate(
            &prev,
            &ThermalInputs {
                flow_su: 0.0,
                damper: false,
                ..ventilated(30.0, 15.0)
            },
            0.1,
        );
        assert!(off.temp_rm < on.temp_rm);
    }

    #[test]
    fn rejects_bad_params() {
        let mut p = SimpleParams::default();
        p.room.tau_h = 0.0;
        assert!(SimpleBuilding::new(p).is_err());
    }

    proptest! {
        #[test]
        fn stays_within_input_range(
            rm in -50.0_f64..150.0,
            wall in -50.0_f64..150.0,
            ins in -50.0_f64..150.0,
            t_su in -50.0_f64..150.0,
            t_out in -50.0_f64..150.0,
            tau in 1.0_f64..36.0,
            dt in 0.0_f64..1.0,
            damper in any::<bool>(),
        ) {
            let params = SimpleParams {
                room: LayerParams::new(1.0, tau),
                construction: LayerParams::new(2.0, tau),
                insulation: LayerParams::new(4.0, tau),
                max_dt_h: 1.0,
                ..SimpleParams::default()
            };
            let model = SimpleBuilding::new(params).unwrap();
            let inputs = ThermalInputs {
                t_out,
                t_supply: t_su,
                flow_su: 0.0,
                damper,
                solar: 0.0,
            };
            let mut s = state(rm, wall, ins);
            for _ in 0..50 {
                s = model.integrate(&s, &inputs, dt);
                for t in s.temperatures() {
                    prop_assert!((-50.0..=150.0).contains(&t), "t = {}", t);
                }
            }
        }
    }
}
