//! Air-handling unit: commands to flows, powers, supply conditions and filters.

use hv_building::FilterModel;
use hv_controls::{
    CoilDemand, ControlCommands, FlowDemand, InertialActuator, RecoveryDemand, SupplyAir,
};
use tracing::debug;

use crate::snapshot::OperatingSnapshot;

/// Bounded-rate step sizes of the tracked quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorSteps {
    pub flow: InertialActuator,
    pub heating: InertialActuator,
    pub cooling: InertialActuator,
    pub recovery: InertialActuator,
}

/// All demand and actuator parameters of the unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AirHandlingUnit {
    pub supply_fan: FlowDemand,
    pub extract_fan: FlowDemand,
    pub heater: CoilDemand,
    pub cooler: CoilDemand,
    pub recovery: RecoveryDemand,
    pub steps: ActuatorSteps,
    pub supply_air: SupplyAir,
    pub filter: FilterModel,
}

impl AirHandlingUnit {
    /// Advance the unit by one tick.
    ///
    /// Delivered commands are merged into `snap` first. Demands follow `cmd`,
    /// so callers pass a command set already filled with the last known
    /// values (see [`ControlCommands::fill_from`]).
    pub fn step(&self, snap: &mut OperatingSnapshot, cmd: &ControlCommands, dt_h: f64) {
        merge_commands(snap, cmd);
        let damper = snap.damp_cmd;

        let su_demand = self
            .supply_fan
            .demand(damper, cmd.fan_su_pos, cmd.fan_step);
        let ex_demand = self
            .extract_fan
            .demand(damper, cmd.fan_ex_pos, cmd.fan_step);
        snap.flow_su = self.steps.flow.track(su_demand, snap.flow_su);
        snap.flow_ex = self.steps.flow.track(ex_demand, snap.flow_ex);

        let htg_demand = self.heater.demand(cmd.pump, snap.htg_pos);
        let clg_demand = self.cooler.demand(cmd.cooling, snap.clg_pos);
        let hrec_demand = self
            .recovery
            .demand(snap.temp, snap.temp_ex, snap.flow_su, snap.hrec_pos);
        snap.htg_pwr = self.steps.heating.track(htg_demand, snap.htg_pwr);
        snap.clg_pwr = self.steps.cooling.track(clg_demand, snap.clg_pwr);
        snap.hrec_pwr = self.steps.recovery.track(hrec_demand, snap.hrec_pwr);

        snap.temp_su = self.supply_air.temperature(
            snap.temp,
            snap.temp_rm,
            snap.flow_su,
            snap.htg_pwr,
            snap.clg_pwr,
            snap.hrec_pwr,
        );
        snap.temp_eh = self
            .supply_air
            .exhaust_temperature(snap.temp_ex, snap.flow_ex, snap.hrec_pwr);

        snap.dust_depo = self
            .filter
            .accumulate(snap.dust_depo, snap.dust, snap.flow_su, dt_h);
        snap.filt_su_pres = self.filter.pressure_drop(snap.dust_depo, snap.flow_su);
        snap.filt_ex_pres = self.filter.pressure_drop(snap.dust_depo, snap.flow_ex);

        debug!(
            flow_su = snap.flow_su,
            flow_ex = snap.flow_ex,
            htg = snap.htg_pwr,
            clg = snap.clg_pwr,
            hrec = snap.hrec_pwr,
            temp_su = snap.temp_su,
            "air handling step"
        );
    }
}

fn merge_commands(snap: &mut OperatingSnapshot, cmd: &ControlCommands) {
    if let Some(v) = cmd.damper {
        snap.damp_cmd = v;
    }
    if let Some(v) = cmd.fan_step {
        snap.fans_stp = v;
    }
    if let Some(v) = cmd.fan_su_pos {
        snap.fan_su_pos = v;
    }
    if let Some(v) = cmd.fan_ex_pos {
        snap.fan_ex_pos = v;
    }
    if let Some(v) = cmd.pump {
        snap.pump_cmd = v;
    }
    if let Some(v) = cmd.htg_pos {
        snap.htg_pos = v;
    }
    if let Some(v) = cmd.cooling {
        snap.clg_cmd = v;
    }
    if let Some(v) = cmd.clg_pos {
        snap.clg_pos = v;
    }
    if let Some(v) = cmd.hrec_pos {
        snap.hrec_pos = v;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hv_building::FilterParams;

    pub(crate) fn unit() -> AirHandlingUnit {
        AirHandlingUnit {
            supply_fan: FlowDemand::new(2400.0, vec![1600.0, 2400.0]).unwrap(),
            extract_fan: FlowDemand::new(2400.0, vec![1600.0, 2400.0]).unwrap(),
            heater: CoilDemand::new(30.0).unwrap(),
            cooler: CoilDemand::new(20.0).unwrap(),
            recovery: RecoveryDemand::default(),
            steps: ActuatorSteps {
                flow: InertialActuator::new(100.0).unwrap(),
                heating: InertialActuator::new(1.0).unwrap(),
                cooling: InertialActuator::new(1.0).unwrap(),
                recovery: InertialActuator::new(1.0).unwrap(),
            },
            supply_air: SupplyAir::default(),
            filter: FilterModel::new(FilterParams::default()).unwrap(),
        }
    }

    #[test]
    fn flow_ramps_toward_step_level() {
        let ahu = unit();
        let mut snap = OperatingSnapshot::default();
        let cmd = ControlCommands {
            damper: Some(true),
            fan_step: Some(1.0),
            ..ControlCommands::default()
        };
        ahu.step(&mut snap, &cmd, 1.0 / 1200.0);
        assert_eq!(snap.flow_su, 50.0);
        assert_eq!(snap.flow_ex, 50.0);
        for _ in 0..200 {
            ahu.step(&mut snap, &cmd, 1.0 / 1200.0);
        }
        assert_eq!(snap.flow_su, 1600.0);
        assert_eq!(snap.fans_stp, 1.0);
    }

    #[test]
    fn closed_damper_stops_fans_and_floors_filters() {
        let ahu = unit();
        let mut snap = OperatingSnapshot {
            flow_su: 0.0,
            temp_rm: 21.0,
            ..OperatingSnapshot::default()
        };
        let cmd = ControlCommands {
            damper: Some(false),
            ..ControlCommands::default()
        };
        ahu.step(&mut snap, &cmd, 0.001);
        assert_eq!(snap.flow_su, 0.0);
        assert_eq!(snap.temp_su, 21.0);
        assert_eq!(snap.filt_su_pres, 2.0);
        assert!(!snap.damp_cmd);
    }

    #[test]
    fn pump_off_removes_heating() {
        let ahu = unit();
        let mut snap = OperatingSnapshot {
            htg_pwr: 10.0,
            htg_pos: 100.0,
            ..OperatingSnapshot::default()
        };
        let cmd = ControlCommands {
            pump: Some(false),
            ..ControlCommands::default()
        };
        ahu.step(&mut snap, &cmd, 0.001);
        assert_eq!(snap.htg_pwr, 9.5);
    }

    #[test]
    fn missing_position_keeps_last_known() {
        let ahu = unit();
        let mut snap = OperatingSnapshot {
            htg_pos: 50.0,
            htg_pwr: 15.0,
            ..OperatingSnapshot::default()
        };
        ahu.step(&mut snap, &ControlCommands::default(), 0.001);
        assert_eq!(snap.htg_pwr, 15.0);
    }
}
