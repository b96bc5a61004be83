//! Filter fouling and pressure drop.
//!
//! Particulate carried by the supply air deposits on the filters. The
//! pressure drop of each side is a clean-fabric term plus a term that grows
//! with the deposit, both quadratic-plus-linear in face velocity.

use serde::{Deserialize, Serialize};

use crate::error::{BuildingResult, non_negative, positive};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Deposit per unit of dust·flow·time, g per (µg/m³ · m³/h · h).
    pub deposit_rate: f64,
    /// Weight of the deposit term, 1/g.
    pub deposit_coeff: f64,
    /// Quadratic coefficient of the clean-fabric term.
    pub fabric_a: f64,
    /// Quadratic coefficient of the deposit drag term.
    pub drag_a: f64,
    /// Flow at which the face velocity equals `rated_velocity`, m³/h.
    pub rated_flow: f64,
    /// Face velocity at rated flow, m/s.
    pub rated_velocity: f64,
    /// Pressure drop reported when there is no flow, Pa.
    pub floor_pa: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            deposit_rate: 0.8e-6,
            deposit_coeff: 0.005,
            fabric_a: 15.6,
            drag_a: 15.6,
            rated_flow: 2400.0,
            rated_velocity: 2.5,
            floor_pa: 2.0,
        }
    }
}

/// Stateless fouling model; the deposit lives in the operating snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterModel {
    params: FilterParams,
}

impl FilterModel {
    pub fn new(params: FilterParams) -> BuildingResult<Self> {
        non_negative(params.deposit_rate, "filter.deposit_rate")?;
        non_negative(params.deposit_coeff, "filter.deposit_coeff")?;
        non_negative(params.fabric_a, "filter.fabric_a")?;
        non_negative(params.drag_a, "filter.drag_a")?;
        positive(params.rated_flow, "filter.rated_flow")?;
        positive(params.rated_velocity, "filter.rated_velocity")?;
        non_negative(params.floor_pa, "filter.floor_pa")?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Deposit after `dt_h` hours of `flow` m³/h carrying `dust` µg/m³.
    /// Never decreases; negative or non-finite inputs add nothing.
    pub fn accumulate(&self, deposit: f64, dust: f64, flow: f64, dt_h: f64) -> f64 {
        let added = self.params.deposit_rate * sane(dust) * sane(flow) * sane(dt_h);
        deposit + added
    }

    /// Face velocity for `flow`, m/s.
    pub fn velocity(&self, flow: f64) -> f64 {
        flow / self.params.rated_flow * self.params.rated_velocity
    }

    /// Pressure drop across one filter, Pa.
    pub fn pressure_drop(&self, deposit: f64, flow: f64) -> f64 {
        if !(flow.is_finite() && flow > 0.0) {
            return self.params.floor_pa;
        }
        let v = self.velocity(flow);
        let fabric = self.params.fabric_a * v * v + v;
        let drag = self.params.drag_a * v * v + v;
        fabric + self.params.deposit_coeff * deposit.max(0.0) * drag
    }
}

#[inline]
fn sane(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model() -> FilterModel {
        FilterModel::new(FilterParams::default()).unwrap()
    }

    #[test]
    fn zero_flow_reports_floor() {
        assert_eq!(model().pressure_drop(50.0, 0.0), 2.0);
        assert_eq!(model().pressure_drop(50.0, -10.0), 2.0);
    }

    #[test]
    fn clean_filter_at_rated_flow() {
        // 15.6·2.5² + 2.5
        assert!((model().pressure_drop(0.0, 2400.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn deposit_accumulates() {
        let m = model();
        let d = m.accumulate(1.0, 20.0, 2400.0, 24.0);
        assert!((d - (1.0 + 0.8e-6 * 20.0 * 2400.0 * 24.0)).abs() < 1e-12);
        assert_eq!(m.accumulate(1.0, -5.0, 2400.0, 1.0), 1.0);
        assert_eq!(m.accumulate(1.0, 20.0, 2400.0, f64::NAN), 1.0);
    }

    proptest! {
        #[test]
        fn deposit_never_decreases(
            deposit in 0.0_f64..1000.0,
            dust in -100.0_f64..500.0,
            flow in -100.0_f64..5000.0,
            dt in -1.0_f64..1.0,
        ) {
            prop_assert!(model().accumulate(deposit, dust, flow, dt) >= deposit);
        }

        #[test]
        fn pressure_drop_grows_with_deposit(
            deposit in 0.0_f64..1000.0,
            extra in 0.0_f64..1000.0,
            flow in 0.0_f64..5000.0,
        ) {
            let m = model();
            prop_assert!(m.pressure_drop(deposit + extra, flow) >= m.pressure_drop(deposit, flow));
        }
    }
}
