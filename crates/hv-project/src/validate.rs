//! Configuration validation logic.

use crate::schema::{
    AirHandlingDef, AirQualityDef, BuildingDef, FanDef, FilterDef, LayerDef, LimitsDef,
    MaterialDef, PlantConfig, RangeDef, StorageDef, TimingDef,
};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be non-negative"))
    }
}

fn fraction(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(invalid(field, v, "must be within 0..1"))
    }
}

fn range(field: &str, r: &RangeDef) -> Result<(), ValidationError> {
    if r.min.is_finite() && r.max.is_finite() && r.min < r.max {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("{}..{}", r.min, r.max),
            "min must be below max",
        ))
    }
}

pub fn validate_config(config: &PlantConfig) -> Result<(), ValidationError> {
    if config.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    validate_timing(&config.timing)?;

    let k = config.ambient.kelvin_offset;
    if !(k.is_finite() && (200.0..=300.0).contains(&k)) {
        return Err(invalid("ambient.kelvin_offset", k, "must be within 200..300"));
    }

    validate_air_handling(&config.air_handling)?;
    validate_building(&config.building)?;
    validate_filter(&config.filter)?;
    validate_air_quality(&config.air_quality)?;
    validate_limits(&config.limits)?;
    validate_storage(&config.storage)?;

    for (key, value) in &config.initial {
        if let crate::schema::InitialValue::Number(v) = value
            && !v.is_finite()
        {
            return Err(invalid(&format!("initial.{key}"), v, "must be finite"));
        }
    }
    Ok(())
}

fn validate_timing(t: &TimingDef) -> Result<(), ValidationError> {
    for (field, v) in [
        ("timing.step_period_s", t.step_period_s),
        ("timing.horizon_hours", t.horizon_hours),
        ("timing.store_period_s", t.store_period_s),
        ("timing.forecast_refresh_s", t.forecast_refresh_s),
        ("timing.dust_refresh_s", t.dust_refresh_s),
    ] {
        if v == 0 {
            return Err(invalid(field, v, "must be positive"));
        }
    }
    if t.poll_interval_ms == 0 || t.poll_interval_ms >= 1000 {
        return Err(invalid(
            "timing.poll_interval_ms",
            t.poll_interval_ms,
            "must be within 1..1000",
        ));
    }
    positive("timing.max_dt_hours", t.max_dt_hours)
}

fn validate_fan(side: &str, fan: &FanDef) -> Result<(), ValidationError> {
    positive(&format!("air_handling.{side}.rated_flow_m3h"), fan.rated_flow_m3h)?;
    for (i, level) in fan.levels_m3h.iter().enumerate() {
        non_negative(&format!("air_handling.{side}.levels_m3h[{i}]"), *level)?;
    }
    Ok(())
}

fn validate_air_handling(a: &AirHandlingDef) -> Result<(), ValidationError> {
    validate_fan("supply", &a.supply)?;
    validate_fan("extract", &a.extract)?;
    non_negative("air_handling.heater_max_kw", a.heater_max_kw)?;
    non_negative("air_handling.cooler_max_kw", a.cooler_max_kw)?;
    fraction("air_handling.recovery.efficiency", a.recovery.efficiency)?;
    non_negative("air_handling.recovery.deadband_c", a.recovery.deadband_c)?;
    positive("air_handling.steps.flow_m3h", a.steps.flow_m3h)?;
    positive("air_handling.steps.heating_kw", a.steps.heating_kw)?;
    positive("air_handling.steps.cooling_kw", a.steps.cooling_kw)?;
    positive("air_handling.steps.recovery_kw", a.steps.recovery_kw)?;
    range("air_handling.supply_temp", &a.supply_temp)
}

fn validate_layer(name: &str, layer: &LayerDef) -> Result<(), ValidationError> {
    positive(&format!("building.{name}.avg"), layer.avg)?;
    positive(&format!("building.{name}.tau_h"), layer.tau_h)
}

fn validate_material(name: &str, m: &MaterialDef) -> Result<(), ValidationError> {
    positive(&format!("building.{name}.thickness_m"), m.thickness_m)?;
    positive(&format!("building.{name}.density_kg_m3"), m.density_kg_m3)?;
    positive(
        &format!("building.{name}.specific_heat_j_kgk"),
        m.specific_heat_j_kgk,
    )?;
    positive(
        &format!("building.{name}.conductivity_w_mk"),
        m.conductivity_w_mk,
    )
}

fn validate_building(b: &BuildingDef) -> Result<(), ValidationError> {
    match b {
        BuildingDef::Simple {
            room,
            construction,
            insulation,
            unventilated_coeff,
        } => {
            validate_layer("room", room)?;
            validate_layer("construction", construction)?;
            validate_layer("insulation", insulation)?;
            positive("building.unventilated_coeff", *unventilated_coeff)
        }
        BuildingDef::Extended {
            envelope,
            wall,
            insulation,
            h_inside,
            h_outside,
            unventilated_coeff,
        } => {
            positive("building.envelope.floor_area_m2", envelope.floor_area_m2)?;
            positive("building.envelope.room_height_m", envelope.room_height_m)?;
            positive("building.envelope.wall_area_m2", envelope.wall_area_m2)?;
            non_negative("building.envelope.glazing_area_m2", envelope.glazing_area_m2)?;
            fraction("building.envelope.g_value", envelope.g_value)?;
            non_negative("building.envelope.internal_gain_w", envelope.internal_gain_w)?;
            non_negative(
                "building.envelope.furnishing_mj_per_k",
                envelope.furnishing_mj_per_k,
            )?;
            validate_material("wall", wall)?;
            validate_material("insulation", insulation)?;
            positive("building.h_inside", *h_inside)?;
            positive("building.h_outside", *h_outside)?;
            positive("building.unventilated_coeff", *unventilated_coeff)
        }
    }
}

fn validate_filter(f: &FilterDef) -> Result<(), ValidationError> {
    non_negative("filter.deposit_rate", f.deposit_rate)?;
    non_negative("filter.deposit_coeff", f.deposit_coeff)?;
    non_negative("filter.fabric_a", f.fabric_a)?;
    non_negative("filter.drag_a", f.drag_a)?;
    positive("filter.rated_flow_m3h", f.rated_flow_m3h)?;
    positive("filter.rated_velocity_ms", f.rated_velocity_ms)?;
    non_negative("filter.floor_pa", f.floor_pa)
}

fn validate_air_quality(a: &AirQualityDef) -> Result<(), ValidationError> {
    non_negative("air_quality.outdoor_ppm", a.outdoor_ppm)?;
    non_negative("air_quality.generation_m3h", a.generation_m3h)?;
    positive("air_quality.room_volume_m3", a.room_volume_m3)?;
    non_negative("air_quality.occupancy.occupants", a.occupancy.occupants)?;
    let occ = &a.occupancy;
    if let Some(day) = occ.weekdays.iter().find(|d| !(1..=7).contains(*d)) {
        return Err(invalid(
            "air_quality.occupancy.weekdays",
            day,
            "must be ISO weekdays 1..7",
        ));
    }
    if occ.start_hour >= occ.end_hour || occ.end_hour > 24 {
        return Err(invalid(
            "air_quality.occupancy",
            format!("{}..{}", occ.start_hour, occ.end_hour),
            "start_hour must be below end_hour <= 24",
        ));
    }
    Ok(())
}

fn validate_limits(l: &LimitsDef) -> Result<(), ValidationError> {
    range("limits.temperature_c", &l.temperature_c)?;
    range("limits.flow_m3h", &l.flow_m3h)?;
    range("limits.power_kw", &l.power_kw)?;
    range("limits.pressure_pa", &l.pressure_pa)?;
    range("limits.co2_ppm", &l.co2_ppm)
}

fn validate_storage(s: &StorageDef) -> Result<(), ValidationError> {
    if s.snapshot_path.trim().is_empty() {
        return Err(invalid("storage.snapshot_path", "", "must not be empty"));
    }
    if s.history_prefix.trim().is_empty() {
        return Err(invalid("storage.history_prefix", "", "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InitialValue;

    #[test]
    fn defaults_are_valid() {
        validate_config(&PlantConfig::default()).unwrap();
    }

    #[test]
    fn error_names_field() {
        let mut config = PlantConfig::default();
        config.air_handling.recovery.efficiency = 1.5;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("air_handling.recovery.efficiency"));
    }

    #[test]
    fn rejects_future_version() {
        let config = PlantConfig {
            version: 99,
            ..PlantConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::UnsupportedVersion { version: 99 })
        ));
    }

    #[test]
    fn rejects_inverted_limits_and_bad_schedule() {
        let mut config = PlantConfig::default();
        config.limits.co2_ppm = RangeDef::new(5000.0, 400.0);
        assert!(validate_config(&config).is_err());

        let mut config = PlantConfig::default();
        config.air_quality.occupancy.weekdays = vec![0];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_non_finite_initial() {
        let mut config = PlantConfig::default();
        config
            .initial
            .insert("temp_rm".to_string(), InitialValue::Number(f64::NAN));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("initial.temp_rm"));
    }

    #[test]
    fn extended_layers_checked() {
        let config = PlantConfig {
            building: BuildingDef::Extended {
                envelope: Default::default(),
                wall: MaterialDef {
                    conductivity_w_mk: 0.0,
                    ..MaterialDef::CONCRETE
                },
                insulation: MaterialDef::MINERAL_WOOL,
                h_inside: 8.0,
                h_outside: 25.0,
                unventilated_coeff: 0.3,
            },
            ..PlantConfig::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("building.wall.conductivity_w_mk"));
    }
}
