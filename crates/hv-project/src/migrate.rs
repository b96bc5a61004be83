//! Schema migration framework.

use crate::ProjectError;
use crate::schema::PlantConfig;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut config: PlantConfig) -> Result<PlantConfig, ProjectError> {
    while config.version < LATEST_VERSION {
        config = migrate_one_version(config)?;
    }
    Ok(config)
}

fn migrate_one_version(config: PlantConfig) -> Result<PlantConfig, ProjectError> {
    match config.version {
        0 => migrate_v0_to_v1(config),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

// Version 0 files came from tooling that used 273.0 as the Kelvin offset
// without writing it out.
fn migrate_v0_to_v1(mut config: PlantConfig) -> Result<PlantConfig, ProjectError> {
    if config.ambient == crate::schema::AmbientDef::default() {
        config.ambient.kelvin_offset = 273.0;
    }
    config.version = 1;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v0_gets_legacy_offset() {
        let config = PlantConfig {
            version: 0,
            ..PlantConfig::default()
        };
        let migrated = migrate_to_latest(config).unwrap();
        assert_eq!(migrated.version, 1);
        assert_eq!(migrated.ambient.kelvin_offset, 273.0);
    }

    #[test]
    fn latest_untouched() {
        let config = PlantConfig::default();
        assert_eq!(migrate_to_latest(config.clone()).unwrap(), config);
    }
}
