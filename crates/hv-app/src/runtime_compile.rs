//! Runtime compilation of a PlantConfig into executable models.

use hv_ambient::AmbientEstimator;
use hv_building::{
    AirQualityModel, AirQualityParams, Envelope, ExtendedBuilding, ExtendedParams, FilterModel,
    FilterParams, LayerParams, Material, OccupancySchedule, SimpleBuilding, SimpleParams,
    ThermalModel,
};
use hv_controls::{CoilDemand, FlowDemand, InertialActuator, RecoveryDemand, SupplyAir};
use hv_core::Bounds;
use hv_project::schema::{
    AirHandlingDef, AirQualityDef, BuildingDef, FanDef, FilterDef, InitialValue, LayerDef,
    LimitsDef, MaterialDef, PlantConfig, RangeDef, TimingDef,
};
use hv_sim::{
    ActuatorSteps, AirHandlingUnit, Limits, OperatingSnapshot, SchedulerOptions, SimulationStep,
    Value,
};

use crate::error::{AppError, AppResult};

fn bounds(r: &RangeDef) -> Bounds {
    Bounds::new(r.min, r.max)
}

fn layer(def: &LayerDef) -> LayerParams {
    LayerParams::new(def.avg, def.tau_h)
}

fn material(def: &MaterialDef) -> Material {
    Material {
        thickness_m: def.thickness_m,
        density_kg_m3: def.density_kg_m3,
        specific_heat_j_kgk: def.specific_heat_j_kgk,
        conductivity_w_mk: def.conductivity_w_mk,
    }
}

fn fan(def: &FanDef) -> AppResult<FlowDemand> {
    Ok(FlowDemand::new(def.rated_flow_m3h, def.levels_m3h.clone())?)
}

/// Build the envelope model selected in the configuration.
pub fn compile_building(def: &BuildingDef, max_dt_h: f64) -> AppResult<Box<dyn ThermalModel>> {
    let model: Box<dyn ThermalModel> = match def {
        BuildingDef::Simple {
            room,
            construction,
            insulation,
            unventilated_coeff,
        } => Box::new(SimpleBuilding::new(SimpleParams {
            room: layer(room),
            construction: layer(construction),
            insulation: layer(insulation),
            unventilated_coeff: *unventilated_coeff,
            max_dt_h,
        })?),
        BuildingDef::Extended {
            envelope,
            wall,
            insulation,
            h_inside,
            h_outside,
            unventilated_coeff,
        } => Box::new(ExtendedBuilding::new(ExtendedParams {
            envelope: Envelope {
                floor_area_m2: envelope.floor_area_m2,
                room_height_m: envelope.room_height_m,
                wall_area_m2: envelope.wall_area_m2,
                glazing_area_m2: envelope.glazing_area_m2,
                g_value: envelope.g_value,
                internal_gain_w: envelope.internal_gain_w,
                furnishing_mj_per_k: envelope.furnishing_mj_per_k,
            },
            wall: material(wall),
            insulation: material(insulation),
            h_inside: *h_inside,
            h_outside: *h_outside,
            unventilated_coeff: *unventilated_coeff,
            max_dt_h,
        })?),
    };
    Ok(model)
}

pub fn compile_filter(def: &FilterDef) -> AppResult<FilterModel> {
    Ok(FilterModel::new(FilterParams {
        deposit_rate: def.deposit_rate,
        deposit_coeff: def.deposit_coeff,
        fabric_a: def.fabric_a,
        drag_a: def.drag_a,
        rated_flow: def.rated_flow_m3h,
        rated_velocity: def.rated_velocity_ms,
        floor_pa: def.floor_pa,
    })?)
}

pub fn compile_unit(def: &AirHandlingDef, filter: &FilterDef) -> AppResult<AirHandlingUnit> {
    Ok(AirHandlingUnit {
        supply_fan: fan(&def.supply)?,
        extract_fan: fan(&def.extract)?,
        heater: CoilDemand::new(def.heater_max_kw)?,
        cooler: CoilDemand::new(def.cooler_max_kw)?,
        recovery: RecoveryDemand::new(def.recovery.efficiency, def.recovery.deadband_c)?,
        steps: ActuatorSteps {
            flow: InertialActuator::new(def.steps.flow_m3h)?,
            heating: InertialActuator::new(def.steps.heating_kw)?,
            cooling: InertialActuator::new(def.steps.cooling_kw)?,
            recovery: InertialActuator::new(def.steps.recovery_kw)?,
        },
        supply_air: SupplyAir::new(bounds(&def.supply_temp)),
        filter: compile_filter(filter)?,
    })
}

pub fn compile_air_quality(def: &AirQualityDef) -> AppResult<AirQualityModel> {
    Ok(AirQualityModel::new(AirQualityParams {
        outdoor_ppm: def.outdoor_ppm,
        generation_m3h: def.generation_m3h,
        room_volume_m3: def.room_volume_m3,
        schedule: OccupancySchedule {
            weekdays: def.occupancy.weekdays.clone(),
            start_hour: def.occupancy.start_hour,
            end_hour: def.occupancy.end_hour,
            occupants: def.occupancy.occupants,
        },
    })?)
}

pub fn compile_limits(def: &LimitsDef) -> Limits {
    Limits {
        temperature: bounds(&def.temperature_c),
        flow: bounds(&def.flow_m3h),
        power: bounds(&def.power_kw),
        pressure: bounds(&def.pressure_pa),
        co2: bounds(&def.co2_ppm),
    }
}

pub fn scheduler_options(def: &TimingDef) -> SchedulerOptions {
    SchedulerOptions {
        step_period_s: def.step_period_s,
        poll_interval_ms: def.poll_interval_ms,
        horizon_hours: def.horizon_hours,
    }
}

pub fn compile_step(config: &PlantConfig) -> AppResult<SimulationStep> {
    let max_dt = config.timing.max_dt_hours;
    let step = SimulationStep::new(
        compile_building(&config.building, max_dt)?,
        compile_unit(&config.air_handling, &config.filter)?,
        compile_air_quality(&config.air_quality)?,
        compile_limits(&config.limits),
    )?
    .with_max_dt_hours(max_dt)?;
    Ok(step)
}

pub fn compile_estimator(config: &PlantConfig) -> AmbientEstimator {
    AmbientEstimator::new(config.ambient.kelvin_offset)
}

/// Built-in defaults with the configured `initial` overrides applied.
pub fn initial_snapshot(config: &PlantConfig) -> AppResult<OperatingSnapshot> {
    let mut snap = OperatingSnapshot::default();
    for (key, value) in &config.initial {
        let value = match *value {
            InitialValue::Bool(b) => Value::Bool(b),
            InitialValue::Number(v) => Value::Float(v),
        };
        snap.set(key, value)
            .map_err(|_| AppError::Validation(format!("initial.{key}: unknown snapshot key")))?;
    }
    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_compiles() {
        let config = PlantConfig::default();
        let step = compile_step(&config).unwrap();
        assert_eq!(step.building_model().name(), "simple");
        assert_eq!(step.unit().heater.max_kw, 30.0);
        assert_eq!(step.unit().supply_fan.levels, vec![1600.0, 2400.0]);
    }

    #[test]
    fn extended_building_selected() {
        let config = PlantConfig {
            building: BuildingDef::Extended {
                envelope: Default::default(),
                wall: MaterialDef::CONCRETE,
                insulation: MaterialDef::MINERAL_WOOL,
                h_inside: 8.0,
                h_outside: 25.0,
                unventilated_coeff: 0.3,
            },
            ..PlantConfig::default()
        };
        let step = compile_step(&config).unwrap();
        assert_eq!(step.building_model().name(), "extended");
    }

    #[test]
    fn initial_overrides_and_unknown_keys() {
        let mut config = PlantConfig::default();
        config
            .initial
            .insert("temp_rm".to_string(), InitialValue::Number(22.0));
        config
            .initial
            .insert("clg_cmd".to_string(), InitialValue::Bool(false));
        let snap = initial_snapshot(&config).unwrap();
        assert_eq!(snap.temp_rm, 22.0);
        assert!(!snap.clg_cmd);

        config
            .initial
            .insert("humidity".to_string(), InitialValue::Number(40.0));
        assert!(matches!(
            initial_snapshot(&config),
            Err(AppError::Validation(_))
        ));
    }
}
