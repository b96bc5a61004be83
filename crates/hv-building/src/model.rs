//! ThermalModel trait and the state it advances.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Largest step integrated in one call unless configured otherwise, hours.
pub const DEFAULT_MAX_DT_HOURS: f64 = 0.25;

/// Temperatures, energies and sink powers of the building envelope.
///
/// The simple model only reads and writes the temperatures; the extended
/// model also carries layer energies (MJ) and the power each layer sinks into
/// the next (W).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingState {
    pub temp_rm: f64,
    pub temp_wall: f64,
    pub temp_ins: f64,
    pub temp_ex: f64,
    pub air_energy: f64,
    pub wall_energy: f64,
    pub ins_energy: f64,
    pub air_sink: f64,
    pub wall_sink: f64,
    pub ins_sink: f64,
}

impl BuildingState {
    /// State with every layer at `t`, energies uninitialised.
    pub fn uniform(t: f64) -> Self {
        Self {
            temp_rm: t,
            temp_wall: t,
            temp_ins: t,
            temp_ex: t,
            ..Self::default()
        }
    }

    pub fn temperatures(&self) -> [f64; 3] {
        [self.temp_rm, self.temp_wall, self.temp_ins]
    }
}

/// Boundary conditions for one integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalInputs {
    /// Outdoor temperature, °C.
    pub t_out: f64,
    /// Supply air temperature, °C.
    pub t_supply: f64,
    /// Supply airflow, m³/h.
    pub flow_su: f64,
    pub damper: bool,
    /// Solar irradiance, W/m².
    pub solar: f64,
}

impl ThermalInputs {
    /// Whether the room is actively ventilated.
    pub fn ventilated(&self) -> bool {
        self.damper || self.flow_su > 0.0
    }

    /// Driving-strength factor: 1 when ventilated, `unventilated` otherwise.
    pub fn coupling(&self, unventilated: f64) -> f64 {
        if self.ventilated() { 1.0 } else { unventilated }
    }
}

/// A lumped building envelope that can be advanced in time.
///
/// Implementations are total: any finite or non-finite `dt_hours` yields a
/// state, with the step clamped by [`clamp_dt`].
pub trait ThermalModel {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Advance `prev` by `dt_hours` under `inputs`.
    fn integrate(&self, prev: &BuildingState, inputs: &ThermalInputs, dt_hours: f64)
    -> BuildingState;

    /// Bring a recovered or default state into the form this model expects.
    fn prepare(&self, state: BuildingState) -> BuildingState {
        state
    }

    /// Re-derive stored quantities from the layer temperatures after they
    /// were corrected outside the model.
    fn rebase(&self, state: BuildingState) -> BuildingState {
        state
    }
}

/// Sanitise an elapsed-time step.
///
/// Negative or non-finite steps become zero. Steps above `max_hours` (after a
/// long pause, for example) are clamped and logged.
pub fn clamp_dt(dt_hours: f64, max_hours: f64) -> f64 {
    if !dt_hours.is_finite() || dt_hours <= 0.0 {
        return 0.0;
    }
    if dt_hours > max_hours {
        warn!(dt_hours, max_hours, "step too long, clamping");
        return max_hours;
    }
    dt_hours
}
