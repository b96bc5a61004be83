//! hv-core: shared foundation for the HVAC plant emulator.
//!
//! Contains:
//! - units (air properties, W·h→MJ and m³/h conversions via uom)
//! - numeric (Real, finite/clamp helpers, Bounds)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
