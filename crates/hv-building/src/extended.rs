//! Energy-balance building model: air, wall and insulation layers.
//!
//! Each layer stores energy referenced to 0 °C, `E = C·T` (MJ). Per step:
//!
//! ```text
//! E_next = E + 0.0036·(P_in − P_sink)·dt_h
//! P_sink = (T − T_sink)·G
//! ```
//!
//! The air layer receives ventilation, solar and internal gains and sinks
//! into the wall; the wall sinks into the insulation; the insulation sinks to
//! outdoor. Capacities and conductances are fixed at construction from the
//! envelope geometry and the wall/insulation materials.

use hv_core::{air, energy_mj};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BuildingResult, non_negative, positive};
use crate::model::{BuildingState, DEFAULT_MAX_DT_HOURS, ThermalInputs, ThermalModel, clamp_dt};

/// Upper bound on explicit sub-steps per call.
const MAX_SUBSTEPS: usize = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub floor_area_m2: f64,
    pub room_height_m: f64,
    /// Opaque external wall area, m².
    pub wall_area_m2: f64,
    pub glazing_area_m2: f64,
    /// Solar energy transmittance of the glazing.
    pub g_value: f64,
    /// Constant internal heat gains (equipment, lighting), W.
    pub internal_gain_w: f64,
    /// Heat capacity of furniture and internal partitions lumped into the air node, MJ/K.
    pub furnishing_mj_per_k: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            floor_area_m2: 300.0,
            room_height_m: 3.0,
            wall_area_m2: 450.0,
            glazing_area_m2: 60.0,
            g_value: 0.6,
            internal_gain_w: 1500.0,
            furnishing_mj_per_k: 5.0,
        }
    }
}

impl Envelope {
    pub fn volume_m3(&self) -> f64 {
        self.floor_area_m2 * self.room_height_m
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub thickness_m: f64,
    pub density_kg_m3: f64,
    pub specific_heat_j_kgk: f64,
    pub conductivity_w_mk: f64,
}

impl Material {
    pub const CONCRETE: Material = Material {
        thickness_m: 0.25,
        density_kg_m3: 2300.0,
        specific_heat_j_kgk: 880.0,
        conductivity_w_mk: 1.7,
    };

    pub const MINERAL_WOOL: Material = Material {
        thickness_m: 0.12,
        density_kg_m3: 30.0,
        specific_heat_j_kgk: 1450.0,
        conductivity_w_mk: 0.04,
    };

    /// Heat capacity of `area_m2` of this material, MJ/K.
    pub fn capacity_mj_per_k(&self, area_m2: f64) -> f64 {
        area_m2 * self.thickness_m * self.density_kg_m3 * self.specific_heat_j_kgk / 1e6
    }

    /// Conduction resistance from the layer centre to one face, m²K/W.
    pub fn half_resistance(&self) -> f64 {
        self.thickness_m / (2.0 * self.conductivity_w_mk)
    }

    fn validate(&self, what: &'static str) -> BuildingResult<()> {
        positive(self.thickness_m, what)?;
        positive(self.density_kg_m3, what)?;
        positive(self.specific_heat_j_kgk, what)?;
        positive(self.conductivity_w_mk, what)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedParams {
    pub envelope: Envelope,
    pub wall: Material,
    pub insulation: Material,
    /// Inside surface coefficient at full ventilation, W/(m²K).
    pub h_inside: f64,
    /// Outside surface coefficient, W/(m²K).
    pub h_outside: f64,
    /// Scale on the inside coefficient while not ventilating.
    pub unventilated_coeff: f64,
    pub max_dt_h: f64,
}

impl Default for ExtendedParams {
    fn default() -> Self {
        Self {
            envelope: Envelope::default(),
            wall: Material::CONCRETE,
            insulation: Material::MINERAL_WOOL,
            h_inside: 8.0,
            h_outside: 25.0,
            unventilated_coeff: 0.3,
            max_dt_h: DEFAULT_MAX_DT_HOURS,
        }
    }
}

/// Energy node with its precomputed constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyLayer {
    pub energy_mj: f64,
    pub capacity_mj_per_k: f64,
    /// Conductance to the next layer, W/K.
    pub conductance_w_per_k: f64,
}

impl EnergyLayer {
    pub fn temperature(&self) -> f64 {
        self.energy_mj / self.capacity_mj_per_k
    }

    /// Power flowing into the sink at `t_sink`, W.
    pub fn sink_power(&self, t_sink: f64) -> f64 {
        (self.temperature() - t_sink) * self.conductance_w_per_k
    }

    fn add(&mut self, net_power_w: f64, dt_h: f64) {
        self.energy_mj += energy_mj(net_power_w, dt_h);
    }

    fn at(&self, t: f64) -> Self {
        Self {
            energy_mj: self.capacity_mj_per_k * t,
            ..*self
        }
    }
}

/// Energy-balance building model with precomputed layer constants.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendedBuilding {
    params: ExtendedParams,
    air: EnergyLayer,
    wall: EnergyLayer,
    ins: EnergyLayer,
}

impl ExtendedBuilding {
    pub fn new(params: ExtendedParams) -> BuildingResult<Self> {
        let env = &params.envelope;
        positive(env.floor_area_m2, "envelope.floor_area_m2")?;
        positive(env.room_height_m, "envelope.room_height_m")?;
        positive(env.wall_area_m2, "envelope.wall_area_m2")?;
        non_negative(env.glazing_area_m2, "envelope.glazing_area_m2")?;
        non_negative(env.g_value, "envelope.g_value")?;
        non_negative(env.internal_gain_w, "envelope.internal_gain_w")?;
        non_negative(env.furnishing_mj_per_k, "envelope.furnishing_mj_per_k")?;
        params.wall.validate("wall")?;
        params.insulation.validate("insulation")?;
        positive(params.h_inside, "h_inside")?;
        positive(params.h_outside, "h_outside")?;
        positive(params.unventilated_coeff, "unventilated_coeff")?;
        positive(params.max_dt_h, "max_dt_h")?;

        let area = env.wall_area_m2;
        let air_capacity =
            env.volume_m3() * air::DENSITY * air::SPECIFIC_HEAT / 1e6 + env.furnishing_mj_per_k;
        let air = EnergyLayer {
            energy_mj: 0.0,
            capacity_mj_per_k: air_capacity,
            conductance_w_per_k: params.h_inside * area,
        };
        let wall = EnergyLayer {
            energy_mj: 0.0,
            capacity_mj_per_k: params.wall.capacity_mj_per_k(area),
            conductance_w_per_k: area
                / (params.wall.half_resistance() + params.insulation.half_resistance()),
        };
        let ins = EnergyLayer {
            energy_mj: 0.0,
            capacity_mj_per_k: params.insulation.capacity_mj_per_k(area),
            conductance_w_per_k: area / (params.insulation.half_resistance() + 1.0 / params.h_outside),
        };
        debug!(
            air_c = air.capacity_mj_per_k,
            wall_c = wall.capacity_mj_per_k,
            ins_c = ins.capacity_mj_per_k,
            air_g = air.conductance_w_per_k,
            wall_g = wall.conductance_w_per_k,
            ins_g = ins.conductance_w_per_k,
            "extended building constants"
        );
        Ok(Self {
            params,
            air,
            wall,
            ins,
        })
    }

    pub fn params(&self) -> &ExtendedParams {
        &self.params
    }

    /// Precomputed (air, wall, insulation) layers with zero energy.
    pub fn layers(&self) -> [EnergyLayer; 3] {
        [self.air, self.wall, self.ins]
    }

    /// Longest explicit step that keeps every node stable, hours.
    fn stable_step_h(&self, air_coupling_w_per_k: f64, vent_w_per_k: f64) -> f64 {
        let air = self.air.capacity_mj_per_k * 1e6 / (air_coupling_w_per_k + vent_w_per_k);
        let wall = self.wall.capacity_mj_per_k * 1e6
            / (air_coupling_w_per_k + self.wall.conductance_w_per_k);
        let ins = self.ins.capacity_mj_per_k * 1e6
            / (self.wall.conductance_w_per_k + self.ins.conductance_w_per_k);
        air.min(wall).min(ins) / 3600.0
    }

    fn load(&self, state: &BuildingState) -> [EnergyLayer; 3] {
        let uninitialised =
            state.air_energy == 0.0 && state.wall_energy == 0.0 && state.ins_energy == 0.0;
        if uninitialised {
            return [
                self.air.at(state.temp_rm),
                self.wall.at(state.temp_wall),
                self.ins.at(state.temp_ins),
            ];
        }
        [
            EnergyLayer {
                energy_mj: state.air_energy,
                ..self.air
            },
            EnergyLayer {
                energy_mj: state.wall_energy,
                ..self.wall
            },
            EnergyLayer {
                energy_mj: state.ins_energy,
                ..self.ins
            },
        ]
    }
}

impl ThermalModel for ExtendedBuilding {
    fn name(&self) -> &'static str {
        "extended"
    }

    fn prepare(&self, state: BuildingState) -> BuildingState {
        let [air, wall, ins] = self.load(&state);
        store(&state, air, wall, ins, [state.air_sink, state.wall_sink, state.ins_sink])
    }

    fn rebase(&self, state: BuildingState) -> BuildingState {
        BuildingState {
            air_energy: self.air.at(state.temp_rm).energy_mj,
            wall_energy: self.wall.at(state.temp_wall).energy_mj,
            ins_energy: self.ins.at(state.temp_ins).energy_mj,
            ..state
        }
    }

    fn integrate(
        &self,
        prev: &BuildingState,
        inputs: &ThermalInputs,
        dt_hours: f64,
    ) -> BuildingState {
        let dt = clamp_dt(dt_hours, self.params.max_dt_h);
        let [mut air, mut wall, mut ins] = self.load(prev);

        let coupling = inputs.coupling(self.params.unventilated_coeff);
        air.conductance_w_per_k = self.air.conductance_w_per_k * coupling;
        let vent = air::capacity_rate_w_per_k(inputs.flow_su.max(0.0));
        let env = &self.params.envelope;
        let gains = inputs.solar.max(0.0) * env.glazing_area_m2 * env.g_value + env.internal_gain_w;

        let stable = self.stable_step_h(air.conductance_w_per_k, vent);
        let substeps = ((dt / (0.5 * stable)).ceil() as usize).clamp(1, MAX_SUBSTEPS);
        let h = dt / substeps as f64;

        let mut sinks = [prev.air_sink, prev.wall_sink, prev.ins_sink];
        for _ in 0..substeps {
            let (t_air, t_wall, t_ins) = (air.temperature(), wall.temperature(), ins.temperature());
            let p_in = vent * (inputs.t_supply - t_air) + gains;
            let air_sink = air.sink_power(t_wall);
            let wall_sink = wall.sink_power(t_ins);
            let ins_sink = ins.sink_power(inputs.t_out);

            air.add(p_in - air_sink, h);
            wall.add(air_sink - wall_sink, h);
            ins.add(wall_sink - ins_sink, h);
            sinks = [air_sink, wall_sink, ins_sink];
        }
        debug!(dt, substeps, t_air = air.temperature(), "extended building step");

        air.conductance_w_per_k = self.air.conductance_w_per_k;
        store(prev, air, wall, ins, sinks)
    }
}

fn store(
    base: &BuildingState,
    air: EnergyLayer,
    wall: EnergyLayer,
    ins: EnergyLayer,
    sinks: [f64; 3],
) -> BuildingState {
    let t_air = air.temperature();
    BuildingState {
        temp_rm: t_air,
        temp_ex: t_air,
        temp_wall: wall.temperature(),
        temp_ins: ins.temperature(),
        air_energy: air.energy_mj,
        wall_energy: wall.energy_mj,
        ins_energy: ins.energy_mj,
        air_sink: sinks[0],
        wall_sink: sinks[1],
        ins_sink: sinks[2],
        ..base.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quiet_params() -> ExtendedParams {
        ExtendedParams {
            envelope: Envelope {
                internal_gain_w: 0.0,
                ..Envelope::default()
            },
            ..ExtendedParams::default()
        }
    }

    fn inputs(t_supply: f64, t_out: f64, flow_su: f64) -> ThermalInputs {
        ThermalInputs {
            t_out,
            t_supply,
            flow_su,
            damper: flow_su > 0.0,
            solar: 0.0,
        }
    }

    #[test]
    fn constants_from_geometry() {
        let b = ExtendedBuilding::new(ExtendedParams::default()).unwrap();
        let [air, wall, ins] = b.layers();
        // 900 m³ of air plus furnishing
        assert!((air.capacity_mj_per_k - (900.0 * 1.2 * 1005.0 / 1e6 + 5.0)).abs() < 1e-9);
        assert!((wall.capacity_mj_per_k - 450.0 * 0.25 * 2300.0 * 880.0 / 1e6).abs() < 1e-6);
        assert!((air.conductance_w_per_k - 3600.0).abs() < 1e-9);
        assert!(ins.conductance_w_per_k > 0.0);
    }

    #[test]
    fn energies_initialised_from_temperatures() {
        let b = ExtendedBuilding::new(ExtendedParams::default()).unwrap();
        let s = b.prepare(BuildingState::uniform(20.0));
        let [air, ..] = b.layers();
        assert!((s.air_energy - 20.0 * air.capacity_mj_per_k).abs() < 1e-9);
        assert!((s.temp_rm - 20.0).abs() < 1e-12);
    }

    #[test]
    fn rebase_follows_corrected_temperatures() {
        let b = ExtendedBuilding::new(ExtendedParams::default()).unwrap();
        let mut s = b.prepare(BuildingState::uniform(20.0));
        s.temp_wall = 35.0;
        let rebased = b.rebase(s);
        let [air, wall, _] = b.layers();
        assert!((rebased.wall_energy - 35.0 * wall.capacity_mj_per_k).abs() < 1e-9);
        assert!((rebased.air_energy - 20.0 * air.capacity_mj_per_k).abs() < 1e-9);
        assert_eq!(rebased.temp_wall, 35.0);
    }

    #[test]
    fn equilibrium_is_steady() {
        let b = ExtendedBuilding::new(quiet_params()).unwrap();
        let prev = b.prepare(BuildingState::uniform(10.0));
        let next = b.integrate(&prev, &inputs(10.0, 10.0, 2400.0), 0.25);
        for t in next.temperatures() {
            assert!((t - 10.0).abs() < 1e-9);
        }
        assert!(next.air_sink.abs() < 1e-6);
    }

    #[test]
    fn warm_supply_heats_air_first() {
        let b = ExtendedBuilding::new(quiet_params()).unwrap();
        let prev = b.prepare(BuildingState::uniform(15.0));
        let next = b.integrate(&prev, &inputs(30.0, 15.0, 2400.0), 0.1);
        assert!(next.temp_rm > 15.0);
        assert!(next.temp_rm > next.temp_wall);
        assert!(next.air_sink > 0.0);
    }

    #[test]
    fn energy_balance_closes() {
        let b = ExtendedBuilding::new(quiet_params()).unwrap();
        let prev = b.prepare(BuildingState {
            temp_rm: 22.0,
            temp_wall: 18.0,
            temp_ins: 5.0,
            temp_ex: 22.0,
            ..BuildingState::default()
        });
        // No ventilation and no gains: everything lost leaves through the insulation.
        let next = b.integrate(&prev, &inputs(22.0, 0.0, 0.0), 0.001);
        let stored = (next.air_energy + next.wall_energy + next.ins_energy)
            - (prev.air_energy + prev.wall_energy + prev.ins_energy);
        let lost = energy_mj(next.ins_sink, 0.001);
        assert!((stored + lost).abs() < 1e-3 * lost.abs());
    }

    #[test]
    fn solar_gain_warms_room() {
        let b = ExtendedBuilding::new(quiet_params()).unwrap();
        let prev = b.prepare(BuildingState::uniform(20.0));
        let sunny = ThermalInputs {
            solar: 600.0,
            ..inputs(20.0, 20.0, 0.0)
        };
        let next = b.integrate(&prev, &sunny, 0.25);
        assert!(next.temp_rm > 20.0);
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut p = ExtendedParams::default();
        p.envelope.wall_area_m2 = -1.0;
        assert!(ExtendedBuilding::new(p).is_err());
        let mut p = ExtendedParams::default();
        p.insulation.conductivity_w_mk = 0.0;
        assert!(ExtendedBuilding::new(p).is_err());
    }

    proptest! {
        #[test]
        fn stays_within_input_range(
            rm in -50.0_f64..150.0,
            wall in -50.0_f64..150.0,
            ins in -50.0_f64..150.0,
            t_su in -50.0_f64..150.0,
            t_out in -50.0_f64..150.0,
            flow in 0.0_f64..5000.0,
            dt in 0.0_f64..1.0,
        ) {
            let params = ExtendedParams { max_dt_h: 1.0, ..quiet_params() };
            let b = ExtendedBuilding::new(params).unwrap();
            let mut s = b.prepare(BuildingState {
                temp_rm: rm,
                temp_wall: wall,
                temp_ins: ins,
                temp_ex: rm,
                ..BuildingState::default()
            });
            for _ in 0..20 {
                s = b.integrate(&s, &inputs(t_su, t_out, flow), dt);
                for t in s.temperatures() {
                    prop_assert!((-50.0 - 1e-6..=150.0 + 1e-6).contains(&t), "t = {}", t);
                }
            }
        }
    }
}
