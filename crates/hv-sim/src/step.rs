//! One simulation tick over the whole plant.

use chrono::NaiveDateTime;
use hv_ambient::OutdoorConditions;
use hv_building::{AirQualityModel, DEFAULT_MAX_DT_HOURS, ThermalInputs, ThermalModel, clamp_dt};
use hv_controls::{ControlCommands, ControlSignal, WriteRequest};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::plant::AirHandlingUnit;
use crate::snapshot::{Limits, OperatingSnapshot};

/// Signals reported back to the controller after each tick, as tracking values.
pub const TRACKED_OUTPUTS: [ControlSignal; 9] = [
    ControlSignal::Temp,
    ControlSignal::TempSu,
    ControlSignal::TempRm,
    ControlSignal::TempEx,
    ControlSignal::TempEh,
    ControlSignal::FlowSu,
    ControlSignal::FlowEx,
    ControlSignal::FiltSuPres,
    ControlSignal::FiltExPres,
];

/// Snapshot keys owned by the building model.
const BUILDING_KEYS: [&str; 6] = [
    "temp_rm",
    "temp_wall",
    "temp_ins",
    "air_energy",
    "wall_energy",
    "ins_energy",
];

/// Everything needed to advance the snapshot by one tick.
pub struct SimulationStep {
    building: Box<dyn ThermalModel>,
    unit: AirHandlingUnit,
    air_quality: AirQualityModel,
    limits: Limits,
    max_dt_hours: f64,
}

impl SimulationStep {
    pub fn new(
        building: Box<dyn ThermalModel>,
        unit: AirHandlingUnit,
        air_quality: AirQualityModel,
        limits: Limits,
    ) -> SimResult<Self> {
        limits.validate()?;
        Ok(Self {
            building,
            unit,
            air_quality,
            limits,
            max_dt_hours: DEFAULT_MAX_DT_HOURS,
        })
    }

    pub fn with_max_dt_hours(mut self, max_dt_hours: f64) -> SimResult<Self> {
        if !max_dt_hours.is_finite() || max_dt_hours <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max_dt_hours must be positive",
            });
        }
        self.max_dt_hours = max_dt_hours;
        Ok(self)
    }

    pub fn building_model(&self) -> &dyn ThermalModel {
        self.building.as_ref()
    }

    pub fn unit(&self) -> &AirHandlingUnit {
        &self.unit
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Let the building model initialise a recovered or default state.
    pub fn prepare(&self, snap: &mut OperatingSnapshot) {
        let state = self.building.prepare(snap.building());
        snap.set_building(&state);
    }

    /// Advance `snap` by `dt_hours`.
    ///
    /// Order: outdoor conditions, building envelope (driven by last tick's
    /// supply air), room CO₂, then the air-handling unit. The result is
    /// sanitised against the state before the tick.
    pub fn advance(
        &self,
        snap: &mut OperatingSnapshot,
        outdoor: &OutdoorConditions,
        cmd: &ControlCommands,
        now: NaiveDateTime,
        dt_hours: f64,
    ) -> Vec<&'static str> {
        let prev = snap.clone();
        let dt = clamp_dt(dt_hours, self.max_dt_hours);

        snap.ti_diff = dt;
        snap.temp = outdoor.temperature;
        snap.preci = outdoor.precipitation;
        snap.solar = outdoor.solar;
        snap.dust = outdoor.dust;

        let inputs = ThermalInputs {
            t_out: snap.temp,
            t_supply: snap.temp_su,
            flow_su: snap.flow_su,
            damper: cmd.damper_or(snap.damp_cmd),
            solar: snap.solar,
        };
        let next = self.building.integrate(&snap.building(), &inputs, dt);
        snap.set_building(&next);

        snap.air_q = self.air_quality.step_at(now, snap.air_q, snap.flow_su, dt);

        self.unit.step(snap, cmd, dt);

        debug!(
            model = self.building.name(),
            dt,
            temp = snap.temp,
            temp_rm = snap.temp_rm,
            air_q = snap.air_q,
            "tick"
        );
        let corrected = snap.sanitize(&prev, &self.limits);
        if corrected.iter().any(|key| BUILDING_KEYS.contains(key)) {
            let state = self.building.rebase(snap.building());
            snap.set_building(&state);
        }
        corrected
    }
}

/// Values reported back to the controller for `snap`.
pub fn write_requests(snap: &OperatingSnapshot) -> Vec<WriteRequest> {
    let mut requests: Vec<WriteRequest> = TRACKED_OUTPUTS
        .iter()
        .filter_map(|&signal| {
            snap.get(signal.as_str())
                .map(|v| WriteRequest::tracking(signal, v.as_f64()))
        })
        .collect();
    requests.push(WriteRequest::present(ControlSignal::AirQ, snap.air_q));
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::tests::unit;
    use chrono::NaiveDate;
    use hv_building::{
        AirQualityParams, BuildingState, ExtendedBuilding, ExtendedParams, SimpleBuilding,
        SimpleParams,
    };
    use hv_core::Bounds;
    use hv_controls::WriteMode;

    fn step() -> SimulationStep {
        SimulationStep::new(
            Box::new(SimpleBuilding::new(SimpleParams::default()).unwrap()),
            unit(),
            AirQualityModel::new(AirQualityParams::default()).unwrap(),
            Limits::default(),
        )
        .unwrap()
    }

    fn sunday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn outdoor_fields_copied() {
        let s = step();
        let mut snap = OperatingSnapshot::default();
        let outdoor = OutdoorConditions {
            temperature: -5.0,
            precipitation: 1.2,
            solar: 300.0,
            dust: 18.0,
        };
        s.advance(
            &mut snap,
            &outdoor,
            &ControlCommands::default(),
            sunday_noon(),
            3.0 / 3600.0,
        );
        assert_eq!(snap.temp, -5.0);
        assert_eq!(snap.preci, 1.2);
        assert_eq!(snap.solar, 300.0);
        assert_eq!(snap.dust, 18.0);
        assert!((snap.ti_diff - 3.0 / 3600.0).abs() < 1e-12);
    }

    #[test]
    fn heating_warms_room_over_hours() {
        let s = step();
        let mut snap = OperatingSnapshot {
            temp_rm: 15.0,
            temp_wall: 15.0,
            temp_ins: 10.0,
            temp_ex: 15.0,
            ..OperatingSnapshot::default()
        };
        let outdoor = OutdoorConditions {
            temperature: 0.0,
            ..OutdoorConditions::default()
        };
        let cmd = ControlCommands {
            damper: Some(true),
            fan_step: Some(1.0),
            pump: Some(true),
            htg_pos: Some(100.0),
            ..ControlCommands::default()
        };
        for _ in 0..1200 {
            s.advance(&mut snap, &outdoor, &cmd, sunday_noon(), 3.0 / 3600.0);
        }
        assert_eq!(snap.flow_su, 1600.0);
        assert_eq!(snap.htg_pwr, 30.0);
        assert!(snap.temp_su > 30.0);
        assert!(snap.temp_rm > 15.0);
    }

    #[test]
    fn unoccupied_ventilation_lowers_co2() {
        let s = step();
        let mut snap = OperatingSnapshot {
            air_q: 1200.0,
            flow_su: 1600.0,
            ..OperatingSnapshot::default()
        };
        let cmd = ControlCommands {
            damper: Some(true),
            fan_step: Some(1.0),
            ..ControlCommands::default()
        };
        s.advance(
            &mut snap,
            &OutdoorConditions::default(),
            &cmd,
            sunday_noon(),
            0.1,
        );
        assert!(snap.air_q < 1200.0);
        assert!(snap.air_q > 420.0);
    }

    #[test]
    fn write_back_list() {
        let snap = OperatingSnapshot::default();
        let requests = write_requests(&snap);
        assert_eq!(requests.len(), 10);
        assert!(
            requests[..9]
                .iter()
                .all(|r| r.mode == WriteMode::Tracking)
        );
        let last = requests[9];
        assert_eq!(last.signal, ControlSignal::AirQ);
        assert_eq!(last.mode, WriteMode::PresentValue);
        assert_eq!(last.value, 456.0);
    }

    #[test]
    fn rejects_bad_max_dt() {
        assert!(step().with_max_dt_hours(0.0).is_err());
        assert!(step().with_max_dt_hours(0.5).is_ok());
    }

    #[test]
    fn clamped_temperatures_resync_layer_energies() {
        let limits = Limits {
            temperature: Bounds::new(-50.0, 30.0),
            ..Limits::default()
        };
        let s = SimulationStep::new(
            Box::new(ExtendedBuilding::new(ExtendedParams::default()).unwrap()),
            unit(),
            AirQualityModel::new(AirQualityParams::default()).unwrap(),
            limits,
        )
        .unwrap();
        let reference = ExtendedBuilding::new(ExtendedParams::default()).unwrap();
        let [air, ..] = reference.layers();

        let mut snap = OperatingSnapshot::default();
        snap.set_building(&BuildingState::uniform(20.0));
        s.prepare(&mut snap);
        snap.temp_rm = 80.0;
        snap.air_energy = air.capacity_mj_per_k * 80.0;

        let cmd = ControlCommands::default();
        let corrected = s.advance(
            &mut snap,
            &OutdoorConditions::default(),
            &cmd,
            sunday_noon(),
            1.0 / 1200.0,
        );
        assert!(corrected.contains(&"temp_rm"));
        assert_eq!(snap.temp_rm, 30.0);
        assert!((snap.air_energy - air.capacity_mj_per_k * 30.0).abs() < 1e-9);

        // The next tick starts from the clamped room, not the stored 80 °C.
        let corrected = s.advance(
            &mut snap,
            &OutdoorConditions::default(),
            &cmd,
            sunday_noon(),
            1.0 / 1200.0,
        );
        assert!(!corrected.contains(&"temp_rm"));
        assert!(snap.temp_rm <= 30.0);
    }
}
