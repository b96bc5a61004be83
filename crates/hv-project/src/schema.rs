//! Plant configuration schema.
//!
//! Every section has defaults, so `version: 1` alone is a valid file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantConfig {
    pub version: u32,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub timing: TimingDef,
    #[serde(default)]
    pub ambient: AmbientDef,
    #[serde(default)]
    pub air_handling: AirHandlingDef,
    #[serde(default)]
    pub building: BuildingDef,
    #[serde(default)]
    pub filter: FilterDef,
    #[serde(default)]
    pub air_quality: AirQualityDef,
    #[serde(default)]
    pub limits: LimitsDef,
    #[serde(default)]
    pub storage: StorageDef,
    #[serde(default)]
    pub sources: SourcesDef,
    /// Snapshot overrides applied on top of the built-in defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub initial: BTreeMap<String, InitialValue>,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: default_name(),
            timing: TimingDef::default(),
            ambient: AmbientDef::default(),
            air_handling: AirHandlingDef::default(),
            building: BuildingDef::default(),
            filter: FilterDef::default(),
            air_quality: AirQualityDef::default(),
            limits: LimitsDef::default(),
            storage: StorageDef::default(),
            sources: SourcesDef::default(),
            initial: BTreeMap::new(),
        }
    }
}

fn default_name() -> String {
    "plant".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingDef {
    pub step_period_s: u64,
    pub poll_interval_ms: u64,
    pub horizon_hours: u64,
    pub store_period_s: u64,
    pub forecast_refresh_s: u64,
    pub dust_refresh_s: u64,
    pub max_dt_hours: f64,
}

impl Default for TimingDef {
    fn default() -> Self {
        Self {
            step_period_s: 3,
            poll_interval_ms: 100,
            horizon_hours: 168,
            store_period_s: 60,
            forecast_refresh_s: 3600,
            dust_refresh_s: 600,
            max_dt_hours: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmbientDef {
    /// Subtracted from forecast temperatures (K) to get °C.
    pub kelvin_offset: f64,
}

impl Default for AmbientDef {
    fn default() -> Self {
        Self {
            kelvin_offset: 273.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FanDef {
    pub rated_flow_m3h: f64,
    /// Flow per discrete fan step, starting at step 1.
    pub levels_m3h: Vec<f64>,
}

impl Default for FanDef {
    fn default() -> Self {
        Self {
            rated_flow_m3h: 2400.0,
            levels_m3h: vec![1600.0, 2400.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecoveryDef {
    pub efficiency: f64,
    pub deadband_c: f64,
}

impl Default for RecoveryDef {
    fn default() -> Self {
        Self {
            efficiency: 0.7,
            deadband_c: 2.0,
        }
    }
}

/// Largest coarse-band distance per tick for each tracked quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StepsDef {
    pub flow_m3h: f64,
    pub heating_kw: f64,
    pub cooling_kw: f64,
    pub recovery_kw: f64,
}

impl Default for StepsDef {
    fn default() -> Self {
        Self {
            flow_m3h: 100.0,
            heating_kw: 1.0,
            cooling_kw: 1.0,
            recovery_kw: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeDef {
    pub min: f64,
    pub max: f64,
}

impl RangeDef {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AirHandlingDef {
    pub supply: FanDef,
    pub extract: FanDef,
    pub heater_max_kw: f64,
    pub cooler_max_kw: f64,
    pub recovery: RecoveryDef,
    pub steps: StepsDef,
    pub supply_temp: RangeDef,
}

impl Default for AirHandlingDef {
    fn default() -> Self {
        Self {
            supply: FanDef::default(),
            extract: FanDef::default(),
            heater_max_kw: 30.0,
            cooler_max_kw: 20.0,
            recovery: RecoveryDef::default(),
            steps: StepsDef::default(),
            supply_temp: RangeDef::new(-20.0, 60.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayerDef {
    pub avg: f64,
    pub tau_h: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeDef {
    pub floor_area_m2: f64,
    pub room_height_m: f64,
    pub wall_area_m2: f64,
    pub glazing_area_m2: f64,
    pub g_value: f64,
    pub internal_gain_w: f64,
    pub furnishing_mj_per_k: f64,
}

impl Default for EnvelopeDef {
    fn default() -> Self {
        Self {
            floor_area_m2: 300.0,
            room_height_m: 3.0,
            wall_area_m2: 450.0,
            glazing_area_m2: 60.0,
            g_value: 0.6,
            internal_gain_w: 1500.0,
            furnishing_mj_per_k: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    pub thickness_m: f64,
    pub density_kg_m3: f64,
    pub specific_heat_j_kgk: f64,
    pub conductivity_w_mk: f64,
}

impl MaterialDef {
    pub const CONCRETE: MaterialDef = MaterialDef {
        thickness_m: 0.25,
        density_kg_m3: 2300.0,
        specific_heat_j_kgk: 880.0,
        conductivity_w_mk: 1.7,
    };

    pub const MINERAL_WOOL: MaterialDef = MaterialDef {
        thickness_m: 0.12,
        density_kg_m3: 30.0,
        specific_heat_j_kgk: 1450.0,
        conductivity_w_mk: 0.04,
    };
}

fn default_room() -> LayerDef {
    LayerDef { avg: 1.0, tau_h: 1.0 }
}

fn default_construction() -> LayerDef {
    LayerDef {
        avg: 2.0,
        tau_h: 36.0,
    }
}

fn default_insulation() -> LayerDef {
    LayerDef { avg: 4.0, tau_h: 2.0 }
}

fn default_unventilated() -> f64 {
    0.3
}

fn default_wall() -> MaterialDef {
    MaterialDef::CONCRETE
}

fn default_insulation_material() -> MaterialDef {
    MaterialDef::MINERAL_WOOL
}

fn default_h_inside() -> f64 {
    8.0
}

fn default_h_outside() -> f64 {
    25.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum BuildingDef {
    Simple {
        #[serde(default = "default_room")]
        room: LayerDef,
        #[serde(default = "default_construction")]
        construction: LayerDef,
        #[serde(default = "default_insulation")]
        insulation: LayerDef,
        #[serde(default = "default_unventilated")]
        unventilated_coeff: f64,
    },
    Extended {
        #[serde(default)]
        envelope: EnvelopeDef,
        #[serde(default = "default_wall")]
        wall: MaterialDef,
        #[serde(default = "default_insulation_material")]
        insulation: MaterialDef,
        #[serde(default = "default_h_inside")]
        h_inside: f64,
        #[serde(default = "default_h_outside")]
        h_outside: f64,
        #[serde(default = "default_unventilated")]
        unventilated_coeff: f64,
    },
}

impl Default for BuildingDef {
    fn default() -> Self {
        BuildingDef::Simple {
            room: default_room(),
            construction: default_construction(),
            insulation: default_insulation(),
            unventilated_coeff: default_unventilated(),
        }
    }
}

impl BuildingDef {
    pub fn model_name(&self) -> &'static str {
        match self {
            BuildingDef::Simple { .. } => "simple",
            BuildingDef::Extended { .. } => "extended",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterDef {
    /// Deposit per (µg/m³ · m³/h · h), g.
    pub deposit_rate: f64,
    pub deposit_coeff: f64,
    pub fabric_a: f64,
    pub drag_a: f64,
    pub rated_flow_m3h: f64,
    pub rated_velocity_ms: f64,
    pub floor_pa: f64,
}

impl Default for FilterDef {
    fn default() -> Self {
        Self {
            deposit_rate: 0.8e-6,
            deposit_coeff: 0.005,
            fabric_a: 15.6,
            drag_a: 15.6,
            rated_flow_m3h: 2400.0,
            rated_velocity_ms: 2.5,
            floor_pa: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OccupancyDef {
    /// ISO weekdays, Monday = 1.
    pub weekdays: Vec<u32>,
    pub start_hour: u32,
    pub end_hour: u32,
    pub occupants: f64,
}

impl Default for OccupancyDef {
    fn default() -> Self {
        Self {
            weekdays: vec![1, 2, 3, 4, 5],
            start_hour: 8,
            end_hour: 18,
            occupants: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AirQualityDef {
    pub outdoor_ppm: f64,
    /// CO₂ exhaled per person, m³/h.
    pub generation_m3h: f64,
    pub room_volume_m3: f64,
    pub occupancy: OccupancyDef,
}

impl Default for AirQualityDef {
    fn default() -> Self {
        Self {
            outdoor_ppm: 420.0,
            generation_m3h: 0.018,
            room_volume_m3: 900.0,
            occupancy: OccupancyDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsDef {
    pub temperature_c: RangeDef,
    pub flow_m3h: RangeDef,
    pub power_kw: RangeDef,
    pub pressure_pa: RangeDef,
    pub co2_ppm: RangeDef,
}

impl Default for LimitsDef {
    fn default() -> Self {
        Self {
            temperature_c: RangeDef::new(-50.0, 150.0),
            flow_m3h: RangeDef::new(0.0, 50_000.0),
            power_kw: RangeDef::new(-1000.0, 1000.0),
            pressure_pa: RangeDef::new(0.0, 10_000.0),
            co2_ppm: RangeDef::new(0.0, 20_000.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageDef {
    pub snapshot_path: String,
    pub history_dir: String,
    pub history_prefix: String,
}

impl Default for StorageDef {
    fn default() -> Self {
        Self {
            snapshot_path: "op_data.txt".to_string(),
            history_dir: ".".to_string(),
            history_prefix: "dump".to_string(),
        }
    }
}

/// Offline feed files. Absent entries leave the quantity unfed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourcesDef {
    /// Directory with `temperature.json`, `precipitation.json`, `solar.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dust_file: Option<String>,
    /// YAML map of controller signal values for the loopback controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_file: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InitialValue {
    Bool(bool),
    Number(f64),
}
