//! Supply and exhaust air temperatures from coil and recovery powers.

use hv_core::{Bounds, air};
use serde::{Deserialize, Serialize};

/// Air-side temperature calculation for the air-handling unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupplyAir {
    /// Plausible supply temperature range, °C.
    pub bounds: Bounds,
}

impl Default for SupplyAir {
    fn default() -> Self {
        Self {
            bounds: Bounds::new(-20.0, 60.0),
        }
    }
}

impl SupplyAir {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Supply air temperature in °C.
    ///
    /// Outdoor air is heated by the heater and recovery and cooled by the
    /// cooler. Without supply flow the duct settles to room temperature.
    pub fn temperature(
        &self,
        t_out: f64,
        t_room: f64,
        flow_su: f64,
        htg_kw: f64,
        clg_kw: f64,
        hrec_kw: f64,
    ) -> f64 {
        let rate = air::capacity_rate_kw_per_k(flow_su);
        if !rate.is_finite() || rate <= 0.0 {
            return self.bounds.clamp_or(t_room, self.bounds.min);
        }
        let t = t_out + (htg_kw - clg_kw + hrec_kw) / rate;
        self.bounds.clamp_or(t, t_room)
    }

    /// Exhaust air temperature after the recovery exchanger, °C.
    pub fn exhaust_temperature(&self, t_extract: f64, flow_ex: f64, hrec_kw: f64) -> f64 {
        let rate = air::capacity_rate_kw_per_k(flow_ex);
        if !rate.is_finite() || rate <= 0.0 {
            return t_extract;
        }
        self.bounds.clamp_or(t_extract - hrec_kw / rate, t_extract)
    }
}

/// [`SupplyAir::temperature`] with the default -20..60 °C range.
pub fn supply_temperature(
    t_out: f64,
    t_room: f64,
    flow_su: f64,
    htg_kw: f64,
    clg_kw: f64,
    hrec_kw: f64,
) -> f64 {
    SupplyAir::default().temperature(t_out, t_room, flow_su, htg_kw, clg_kw, hrec_kw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heater_raises_supply() {
        // 3600 m³/h carries 1.206 kW/K
        let t = supply_temperature(0.0, 20.0, 3600.0, 12.06, 0.0, 0.0);
        assert!((t - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cooler_and_recovery_combine() {
        let t = supply_temperature(30.0, 24.0, 3600.0, 0.0, 12.06, -6.03);
        assert!((t - 15.0).abs() < 1e-9);
    }

    #[test]
    fn zero_flow_follows_room() {
        assert_eq!(supply_temperature(-5.0, 21.0, 0.0, 30.0, 0.0, 0.0), 21.0);
    }

    #[test]
    fn clamped_to_bounds() {
        assert_eq!(supply_temperature(0.0, 20.0, 100.0, 30.0, 0.0, 0.0), 60.0);
        assert_eq!(supply_temperature(-15.0, 20.0, 100.0, 0.0, 20.0, 0.0), -20.0);
    }

    #[test]
    fn exhaust_cooled_by_recovery() {
        let air = SupplyAir::default();
        let t = air.exhaust_temperature(20.0, 3600.0, 12.06);
        assert!((t - 10.0).abs() < 1e-9);
        assert_eq!(air.exhaust_temperature(20.0, 0.0, 12.06), 20.0);
    }
}
