//! The operating snapshot threaded through every step.

use std::fmt;

use hv_building::BuildingState;
use hv_controls::{ControlReadings, SignalValue};
use hv_core::{Bounds, finite_or};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SimError, SimResult};

/// A snapshot field value as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Float(f64),
}

impl Value {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Float(v) => v,
        }
    }

    pub fn as_bool(&self) -> bool {
        match *self {
            Self::Bool(b) => b,
            Self::Float(v) => v != 0.0,
        }
    }
}

/// `True`/`False` for booleans, shortest round-trip form for floats.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<SignalValue> for Value {
    fn from(v: SignalValue) -> Self {
        match v {
            SignalValue::Bool(b) => Self::Bool(b),
            SignalValue::Scalar(x) => Self::Float(x),
        }
    }
}

trait FromValue {
    fn from_value(v: Value) -> Self;
}

impl FromValue for bool {
    fn from_value(v: Value) -> Self {
        v.as_bool()
    }
}

impl FromValue for f64 {
    fn from_value(v: Value) -> Self {
        v.as_f64()
    }
}

macro_rules! operating_snapshot {
    ($( $(#[$doc:meta])* $field:ident : $ty:ty = $default:expr ),* $(,)?) => {
        /// Complete operating data of the plant at one tick.
        ///
        /// Field names double as persistence keys and controller signal names.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct OperatingSnapshot {
            $( $(#[$doc])* pub $field: $ty, )*
        }

        impl Default for OperatingSnapshot {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        impl OperatingSnapshot {
            /// Every key in persistence order.
            pub const KEYS: &'static [&'static str] = &[$( stringify!($field), )*];

            /// All fields in persistence order.
            pub fn entries(&self) -> Vec<(&'static str, Value)> {
                vec![$( (stringify!($field), Value::from(self.$field)), )*]
            }

            pub fn get(&self, key: &str) -> Option<Value> {
                $( if key == stringify!($field) { return Some(Value::from(self.$field)); } )*
                None
            }

            /// Set a field by key. The value is coerced to the field's type.
            pub fn set(&mut self, key: &str, value: Value) -> SimResult<()> {
                $(
                    if key == stringify!($field) {
                        self.$field = <$ty as FromValue>::from_value(value);
                        return Ok(());
                    }
                )*
                Err(SimError::UnknownKey { key: key.to_string() })
            }
        }
    };
}

operating_snapshot! {
    /// Outdoor temperature, °C
    temp: f64 = 10.0,
    /// Precipitation, mm/h
    preci: f64 = 0.0,
    /// Solar irradiance, W/m²
    solar: f64 = 0.0,
    /// PM10, µg/m³
    dust: f64 = 0.0,
    /// Hours since the previous step
    ti_diff: f64 = 0.0,
    temp_su: f64 = 20.0,
    temp_rm: f64 = 20.0,
    temp_wall: f64 = 18.0,
    temp_ins: f64 = 16.0,
    temp_ex: f64 = 20.0,
    /// Exhaust air after heat recovery, °C
    temp_eh: f64 = 5.5,
    /// Layer energies, MJ
    air_energy: f64 = 0.0,
    wall_energy: f64 = 0.0,
    ins_energy: f64 = 0.0,
    /// Layer sink powers, W
    air_sink: f64 = 0.0,
    wall_sink: f64 = 0.0,
    ins_sink: f64 = 0.0,
    damp_cmd: bool = true,
    fans_stp: f64 = 0.0,
    fan_su_pos: f64 = 0.0,
    fan_ex_pos: f64 = 0.0,
    /// m³/h
    flow_su: f64 = 0.0,
    flow_ex: f64 = 0.0,
    pump_cmd: bool = true,
    htg_pos: f64 = 0.0,
    /// kW
    htg_pwr: f64 = 0.0,
    clg_cmd: bool = true,
    clg_pos: f64 = 0.0,
    clg_pwr: f64 = 0.0,
    hrec_pos: f64 = 0.0,
    hrec_pwr: f64 = 0.0,
    /// Filter deposit, g
    dust_depo: f64 = 0.0,
    /// Pa
    filt_su_pres: f64 = 2.0,
    filt_ex_pres: f64 = 2.0,
    /// Room CO₂, ppm
    air_q: f64 = 456.0,
    /// Simulated run time, s
    run_seconds: f64 = 0.0,
}

impl OperatingSnapshot {
    /// Merge controller readings into the matching fields. Returns the
    /// number of fields updated.
    pub fn apply_readings(&mut self, readings: &ControlReadings) -> usize {
        readings
            .iter()
            .filter(|(signal, value)| self.set(signal.as_str(), Value::from(*value)).is_ok())
            .count()
    }

    pub fn building(&self) -> BuildingState {
        BuildingState {
            temp_rm: self.temp_rm,
            temp_wall: self.temp_wall,
            temp_ins: self.temp_ins,
            temp_ex: self.temp_ex,
            air_energy: self.air_energy,
            wall_energy: self.wall_energy,
            ins_energy: self.ins_energy,
            air_sink: self.air_sink,
            wall_sink: self.wall_sink,
            ins_sink: self.ins_sink,
        }
    }

    pub fn set_building(&mut self, state: &BuildingState) {
        self.temp_rm = state.temp_rm;
        self.temp_wall = state.temp_wall;
        self.temp_ins = state.temp_ins;
        self.temp_ex = state.temp_ex;
        self.air_energy = state.air_energy;
        self.wall_energy = state.wall_energy;
        self.ins_energy = state.ins_energy;
        self.air_sink = state.air_sink;
        self.wall_sink = state.wall_sink;
        self.ins_sink = state.ins_sink;
    }

    /// Replace non-finite fields with their value in `prev` and clamp bounded
    /// quantities into `limits`. Returns the keys that were corrected.
    pub fn sanitize(&mut self, prev: &OperatingSnapshot, limits: &Limits) -> Vec<&'static str> {
        let mut corrected = Vec::new();
        for (key, value) in self.entries() {
            let Value::Float(v) = value else { continue };
            let fallback = prev.get(key).map(|p| p.as_f64()).unwrap_or(0.0);
            let fallback = finite_or(fallback, 0.0);
            let fixed = match limits.bounds_for(key) {
                Some(bounds) => bounds.clamp_or(v, fallback),
                None => finite_or(v, fallback),
            };
            if fixed.to_bits() != v.to_bits() {
                warn!(key, value = v, fixed, "snapshot value corrected");
                if self.set(key, Value::Float(fixed)).is_ok() {
                    corrected.push(key);
                }
            }
        }
        corrected
    }
}

/// Plausible ranges for bounded physical quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// °C
    pub temperature: Bounds,
    /// m³/h
    pub flow: Bounds,
    /// kW
    pub power: Bounds,
    /// Pa
    pub pressure: Bounds,
    /// ppm
    pub co2: Bounds,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            temperature: Bounds::new(-50.0, 150.0),
            flow: Bounds::new(0.0, 50_000.0),
            power: Bounds::new(-1000.0, 1000.0),
            pressure: Bounds::new(0.0, 10_000.0),
            co2: Bounds::new(0.0, 20_000.0),
        }
    }
}

impl Limits {
    pub fn bounds_for(&self, key: &str) -> Option<Bounds> {
        match key {
            "temp" | "temp_su" | "temp_rm" | "temp_wall" | "temp_ins" | "temp_ex" | "temp_eh" => {
                Some(self.temperature)
            }
            "flow_su" | "flow_ex" => Some(self.flow),
            "htg_pwr" | "clg_pwr" | "hrec_pwr" => Some(self.power),
            "filt_su_pres" | "filt_ex_pres" => Some(self.pressure),
            "air_q" => Some(self.co2),
            _ => None,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        for (what, b) in [
            ("limits.temperature", self.temperature),
            ("limits.flow", self.flow),
            ("limits.power", self.power),
            ("limits.pressure", self.pressure),
            ("limits.co2", self.co2),
        ] {
            b.validate(what)?;
        }
        Ok(())
    }
}
