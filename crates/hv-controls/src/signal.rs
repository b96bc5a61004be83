//! Controller signal names, raw readings and typed command sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ControlError;

/// A named data point on the controller.
///
/// The names match the keys used in the operating snapshot so a reading can
/// be merged into it without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSignal {
    DampCmd,
    FansStp,
    FanSuPos,
    FanExPos,
    PumpCmd,
    HtgPos,
    ClgCmd,
    ClgPos,
    HrecPos,
    Temp,
    TempSu,
    TempRm,
    TempEx,
    TempEh,
    FlowSu,
    FlowEx,
    FiltSuPres,
    FiltExPres,
    AirQ,
}

impl ControlSignal {
    /// Command signals read on every tick.
    pub const COMMANDS: [ControlSignal; 9] = [
        Self::DampCmd,
        Self::FansStp,
        Self::FanSuPos,
        Self::FanExPos,
        Self::PumpCmd,
        Self::HtgPos,
        Self::ClgCmd,
        Self::ClgPos,
        Self::HrecPos,
    ];

    /// Signals read once at start to seed the snapshot.
    pub const STARTUP: [ControlSignal; 14] = [
        Self::DampCmd,
        Self::FanSuPos,
        Self::FlowSu,
        Self::FanExPos,
        Self::FlowEx,
        Self::HrecPos,
        Self::PumpCmd,
        Self::HtgPos,
        Self::ClgCmd,
        Self::ClgPos,
        Self::Temp,
        Self::TempSu,
        Self::TempRm,
        Self::AirQ,
    ];

    const ALL: [ControlSignal; 19] = [
        Self::DampCmd,
        Self::FansStp,
        Self::FanSuPos,
        Self::FanExPos,
        Self::PumpCmd,
        Self::HtgPos,
        Self::ClgCmd,
        Self::ClgPos,
        Self::HrecPos,
        Self::Temp,
        Self::TempSu,
        Self::TempRm,
        Self::TempEx,
        Self::TempEh,
        Self::FlowSu,
        Self::FlowEx,
        Self::FiltSuPres,
        Self::FiltExPres,
        Self::AirQ,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DampCmd => "damp_cmd",
            Self::FansStp => "fans_stp",
            Self::FanSuPos => "fan_su_pos",
            Self::FanExPos => "fan_ex_pos",
            Self::PumpCmd => "pump_cmd",
            Self::HtgPos => "htg_pos",
            Self::ClgCmd => "clg_cmd",
            Self::ClgPos => "clg_pos",
            Self::HrecPos => "hrec_pos",
            Self::Temp => "temp",
            Self::TempSu => "temp_su",
            Self::TempRm => "temp_rm",
            Self::TempEx => "temp_ex",
            Self::TempEh => "temp_eh",
            Self::FlowSu => "flow_su",
            Self::FlowEx => "flow_ex",
            Self::FiltSuPres => "filt_su_pres",
            Self::FiltExPres => "filt_ex_pres",
            Self::AirQ => "air_q",
        }
    }

    /// On/off bits; everything else is a scalar.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::DampCmd | Self::PumpCmd | Self::ClgCmd)
    }
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlSignal {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sig| sig.as_str() == s)
            .ok_or_else(|| ControlError::UnknownSignal {
                name: s.to_string(),
            })
    }
}

/// Value carried by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Bool(bool),
    Scalar(f64),
}

impl SignalValue {
    /// Numeric view; booleans map to `1.0` / `0.0`.
    pub fn as_scalar(&self) -> f64 {
        match *self {
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Scalar(v) => v,
        }
    }

    /// Boolean view; any non-zero scalar is `true`.
    pub fn as_bool(&self) -> bool {
        match *self {
            Self::Bool(b) => b,
            Self::Scalar(v) => v != 0.0,
        }
    }
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Values returned by one controller read. Any requested signal may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlReadings(BTreeMap<ControlSignal, SignalValue>);

impl ControlReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, coercing it to the signal's natural type.
    pub fn insert(&mut self, signal: ControlSignal, value: impl Into<SignalValue>) {
        let value = value.into();
        let value = if signal.is_boolean() {
            SignalValue::Bool(value.as_bool())
        } else {
            SignalValue::Scalar(value.as_scalar())
        };
        self.0.insert(signal, value);
    }

    pub fn get(&self, signal: ControlSignal) -> Option<SignalValue> {
        self.0.get(&signal).copied()
    }

    pub fn scalar(&self, signal: ControlSignal) -> Option<f64> {
        self.get(signal)
            .map(|v| v.as_scalar())
            .filter(|v| v.is_finite())
    }

    pub fn flag(&self, signal: ControlSignal) -> Option<bool> {
        self.get(signal).map(|v| v.as_bool())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ControlSignal, SignalValue)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(ControlSignal, SignalValue)> for ControlReadings {
    fn from_iter<I: IntoIterator<Item = (ControlSignal, SignalValue)>>(iter: I) -> Self {
        let mut readings = Self::new();
        for (signal, value) in iter {
            readings.insert(signal, value);
        }
        readings
    }
}

/// Commands the controller issued on this tick.
///
/// `None` means the signal was not delivered, which is distinct from a zero
/// or `false` value: demand derivation falls back differently for each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlCommands {
    pub damper: Option<bool>,
    pub fan_step: Option<f64>,
    pub fan_su_pos: Option<f64>,
    pub fan_ex_pos: Option<f64>,
    pub pump: Option<bool>,
    pub htg_pos: Option<f64>,
    pub cooling: Option<bool>,
    pub clg_pos: Option<f64>,
    pub hrec_pos: Option<f64>,
}

impl ControlCommands {
    /// Damper state, or `fallback` when the controller did not report it.
    pub fn damper_or(&self, fallback: bool) -> bool {
        self.damper.unwrap_or(fallback)
    }

    /// Signals missing from this read take their value from `last`.
    pub fn fill_from(self, last: &ControlCommands) -> Self {
        Self {
            damper: self.damper.or(last.damper),
            fan_step: self.fan_step.or(last.fan_step),
            fan_su_pos: self.fan_su_pos.or(last.fan_su_pos),
            fan_ex_pos: self.fan_ex_pos.or(last.fan_ex_pos),
            pump: self.pump.or(last.pump),
            htg_pos: self.htg_pos.or(last.htg_pos),
            cooling: self.cooling.or(last.cooling),
            clg_pos: self.clg_pos.or(last.clg_pos),
            hrec_pos: self.hrec_pos.or(last.hrec_pos),
        }
    }
}

impl From<&ControlReadings> for ControlCommands {
    fn from(readings: &ControlReadings) -> Self {
        use ControlSignal::*;
        Self {
            damper: readings.flag(DampCmd),
            fan_step: readings.scalar(FansStp),
            fan_su_pos: readings.scalar(FanSuPos),
            fan_ex_pos: readings.scalar(FanExPos),
            pump: readings.flag(PumpCmd),
            htg_pos: readings.scalar(HtgPos),
            cooling: readings.flag(ClgCmd),
            clg_pos: readings.scalar(ClgPos),
            hrec_pos: readings.scalar(HrecPos),
        }
    }
}

/// How a written value is applied on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Override the point's input with a tracking value.
    Tracking,
    /// Write the point's present value directly.
    PresentValue,
}

/// One value pushed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
    pub signal: ControlSignal,
    pub value: f64,
    pub mode: WriteMode,
}

impl WriteRequest {
    pub fn tracking(signal: ControlSignal, value: f64) -> Self {
        Self {
            signal,
            value,
            mode: WriteMode::Tracking,
        }
    }

    pub fn present(signal: ControlSignal, value: f64) -> Self {
        Self {
            signal,
            value,
            mode: WriteMode::PresentValue,
        }
    }
}
