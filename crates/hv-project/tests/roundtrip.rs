use hv_project::schema::*;
use hv_project::{load_json, load_yaml, parse_yaml, save_json, save_yaml};

#[test]
fn minimal_file_gets_defaults() {
    let config = parse_yaml("version: 1\n").unwrap();
    assert_eq!(config, PlantConfig::default());
    assert_eq!(config.building.model_name(), "simple");
    assert_eq!(config.timing.store_period_s, 60);
    assert_eq!(config.air_handling.supply.levels_m3h, vec![1600.0, 2400.0]);
}

#[test]
fn partial_sections_fill_in() {
    let config = parse_yaml(
        "version: 1\nair_handling:\n  heater_max_kw: 45\nbuilding:\n  model: extended\n  h_inside: 7.5\n",
    )
    .unwrap();
    assert_eq!(config.air_handling.heater_max_kw, 45.0);
    assert_eq!(config.air_handling.cooler_max_kw, 20.0);
    match config.building {
        BuildingDef::Extended {
            h_inside,
            h_outside,
            wall,
            ..
        } => {
            assert_eq!(h_inside, 7.5);
            assert_eq!(h_outside, 25.0);
            assert_eq!(wall, MaterialDef::CONCRETE);
        }
        other => panic!("expected extended building, got {other:?}"),
    }
}

#[test]
fn initial_values_keep_their_type() {
    let config =
        parse_yaml("version: 1\ninitial:\n  temp_rm: 21.5\n  pump_cmd: false\n").unwrap();
    assert_eq!(config.initial["temp_rm"], InitialValue::Number(21.5));
    assert_eq!(config.initial["pump_cmd"], InitialValue::Bool(false));
}

#[test]
fn invalid_file_is_rejected() {
    let err = parse_yaml("version: 1\ntiming:\n  step_period_s: 0\n").unwrap_err();
    assert!(err.to_string().contains("timing.step_period_s"));
}

#[test]
fn roundtrip_yaml_and_json() {
    let mut config = PlantConfig {
        name: "roundtrip".to_string(),
        ..PlantConfig::default()
    };
    config.sources.forecast_dir = Some("replay".to_string());
    config
        .initial
        .insert("air_q".to_string(), InitialValue::Number(500.0));

    let temp_dir = std::env::temp_dir();
    let yaml_path = temp_dir.join("hv_project_roundtrip.yaml");
    save_yaml(&yaml_path, &config).unwrap();
    assert_eq!(load_yaml(&yaml_path).unwrap(), config);

    let json_path = temp_dir.join("hv_project_roundtrip.json");
    save_json(&json_path, &config).unwrap();
    let loaded = load_json(&json_path).unwrap();
    assert_eq!(loaded.name, config.name);
    assert_eq!(loaded.sources, config.sources);
    assert_eq!(loaded.initial, config.initial);
    assert_eq!(loaded.timing, config.timing);
}
