//! Plant stepping and wall-clock scheduling for the HVAC emulator.
//!
//! Provides:
//! - the operating snapshot threaded through every tick
//! - the air-handling unit (flows, coil powers, supply air, filters)
//! - one-tick coordination of ambient, building, CO₂ and plant
//! - a poll-driven scheduler over a pluggable clock

pub mod clock;
pub mod error;
pub mod plant;
pub mod scheduler;
pub mod snapshot;
pub mod step;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{SimError, SimResult};
pub use plant::{ActuatorSteps, AirHandlingUnit};
pub use scheduler::{Cadence, Scheduler, SchedulerOptions, SchedulerState, Tick};
pub use snapshot::{Limits, OperatingSnapshot, Value};
pub use step::{SimulationStep, TRACKED_OUTPUTS, write_requests};
