//! Building envelope, filter and indoor air models for the plant emulator.
//!
//! - [`model`]: the [`ThermalModel`] trait, [`BuildingState`] and step sanitising
//! - [`simple`]: temperature-only three-layer chain
//! - [`extended`]: energy-balance model with geometry-derived constants
//! - [`filter`]: particulate deposit and filter pressure drop
//! - [`air_quality`]: room CO₂ from occupancy and ventilation
//!
//! None of the models fail on numeric input; only construction validates.

pub mod air_quality;
pub mod error;
pub mod extended;
pub mod filter;
pub mod layer;
pub mod model;
pub mod simple;

pub use air_quality::{AirQualityModel, AirQualityParams, OccupancySchedule};
pub use error::{BuildingError, BuildingResult};
pub use extended::{EnergyLayer, Envelope, ExtendedBuilding, ExtendedParams, Material};
pub use filter::{FilterModel, FilterParams};
pub use layer::{LayerParams, relax};
pub use model::{BuildingState, DEFAULT_MAX_DT_HOURS, ThermalInputs, ThermalModel, clamp_dt};
pub use simple::{SimpleBuilding, SimpleParams};
