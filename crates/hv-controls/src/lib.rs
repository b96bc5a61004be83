//! Controller-side signals and actuator dynamics for the plant emulator.
//!
//! The building-automation controller drives the plant with a handful of
//! commands: damper/pump/cooling on-off bits, valve positions in percent and a
//! discrete fan step. This crate turns those commands into physically
//! plausible flows and powers.
//!
//! # Architecture
//!
//! - [`signal`]: signal names, raw readings, typed command sets
//! - [`demand`]: commands → instantaneous demand per quantity
//! - [`actuator`]: bounded-rate tracking of demand (inertia)
//! - [`supply`]: supply-air temperature from coil and recovery powers
//! - [`link`]: the controller read/write seam and an in-memory loopback
//!
//! Everything except [`link`] is a pure function of its inputs.

pub mod actuator;
pub mod demand;
pub mod error;
pub mod link;
pub mod signal;
pub mod supply;

pub use actuator::{InertialActuator, track};
pub use demand::{CoilDemand, FlowDemand, RecoveryDemand};
pub use error::{ControlError, ControlResult, LinkError};
pub use link::{ControllerLink, LoopbackController};
pub use signal::{ControlCommands, ControlReadings, ControlSignal, SignalValue, WriteMode, WriteRequest};
pub use supply::{SupplyAir, supply_temperature};
