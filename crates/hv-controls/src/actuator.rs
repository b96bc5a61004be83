//! Actuator dynamics for plant quantities.
//!
//! Flows and coil powers do not jump to the commanded value. Each tick the
//! tracked value moves toward the demand in bounded increments:
//!
//! | distance to demand             | move            |
//! |--------------------------------|-----------------|
//! | more than `max_step`           | `max_step / 2`  |
//! | more than `max_step / 10`      | `max_step / 20` |
//! | otherwise                      | snap to demand  |
//!
//! The coarse step closes large gaps quickly, the fine step settles without
//! overshoot, and the snap removes the residual.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Move `current` one tick toward `demand`.
pub fn track(demand: f64, current: f64, max_step: f64) -> f64 {
    let coarse = max_step / 2.0;
    let fine = max_step / 20.0;
    let band = max_step / 10.0;

    if current < demand - max_step {
        current + coarse
    } else if current < demand - band {
        current + fine
    } else if current > demand + max_step {
        current - coarse
    } else if current > demand + band {
        current - fine
    } else {
        demand
    }
}

/// Bounded-rate actuator: the step size of one tracked quantity.
///
/// # Example
///
/// ```
/// use hv_controls::InertialActuator;
///
/// let fan = InertialActuator::new(100.0).unwrap();
/// let mut flow = 0.0;
///
/// for _ in 0..200 {
///     flow = fan.track(1800.0, flow);
/// }
///
/// assert_eq!(flow, 1800.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InertialActuator {
    /// Largest distance covered by the coarse band, in the quantity's unit.
    pub max_step: f64,
}

impl InertialActuator {
    /// Create a new actuator.
    ///
    /// # Errors
    ///
    /// Returns error if `max_step` is not a positive finite number.
    pub fn new(max_step: f64) -> ControlResult<Self> {
        if !(max_step.is_finite() && max_step > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        Ok(Self { max_step })
    }

    /// Move `current` one tick toward `demand`.
    #[inline]
    pub fn track(&self, demand: f64, current: f64) -> f64 {
        track(demand, current, self.max_step)
    }
}
