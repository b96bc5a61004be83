// hv-core/src/units.rs

use uom::si::f64::{Energy, Power, Time, VolumeRate};

#[inline]
fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

#[inline]
fn m3ph(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_hour;
    VolumeRate::new::<cubic_meter_per_hour>(v)
}

/// Energy in MJ delivered by `power_w` watts over `dt_hours` hours.
///
/// Equivalent to `0.0036 * power_w * dt_hours`.
#[inline]
pub fn energy_mj(power_w: f64, dt_hours: f64) -> f64 {
    use uom::si::energy::megajoule;
    let e: Energy = watts(power_w) * hours(dt_hours);
    e.get::<megajoule>()
}

pub mod air {
    //! Dry air properties at room conditions.

    use super::*;

    /// kg/m³
    pub const DENSITY: f64 = 1.2;
    /// J/(kg·K)
    pub const SPECIFIC_HEAT: f64 = 1005.0;

    /// Heat capacity rate of an airflow, W/K.
    #[inline]
    pub fn capacity_rate_w_per_k(flow_m3h: f64) -> f64 {
        use uom::si::volume_rate::cubic_meter_per_second;
        m3ph(flow_m3h).get::<cubic_meter_per_second>() * DENSITY * SPECIFIC_HEAT
    }

    /// Heat capacity rate of an airflow, kW/K.
    #[inline]
    pub fn capacity_rate_kw_per_k(flow_m3h: f64) -> f64 {
        capacity_rate_w_per_k(flow_m3h) / 1000.0
    }
}
