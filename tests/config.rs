use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use assert_matches::assert_matches;

use cdc_places::config::{Config, ConfigLoader};
use cdc_places::error::PlacesError;
use cdc_places::registry::DatasetRegistry;

#[test]
fn explicit_config_file_is_loaded() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("places.json");
    fs::write(
        &path,
        r#"{"schema_version": 1, "data_dir": "/srv/places", "timeout_secs": 30, "years": [2023, 2020]}"#,
    )
    .unwrap();

    let resolved =
        ConfigLoader::resolve(path.to_str(), &DatasetRegistry::builtin()).unwrap();

    assert_eq!(resolved.data_dir, PathBuf::from("/srv/places"));
    assert_eq!(resolved.timeout, Duration::from_secs(30));
    assert_eq!(resolved.years, vec![2023, 2020]);
}

#[test]
fn partial_config_keeps_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("places.json");
    fs::write(&path, r#"{"timeout_secs": 5}"#).unwrap();

    let registry = DatasetRegistry::builtin();
    let resolved = ConfigLoader::resolve(path.to_str(), &registry).unwrap();

    assert_eq!(resolved.timeout, Duration::from_secs(5));
    assert_eq!(resolved.years, registry.years());
    assert_eq!(resolved.data_dir, PathBuf::from("data"));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");

    assert_matches!(
        ConfigLoader::resolve(path.to_str(), &DatasetRegistry::builtin()),
        Err(PlacesError::ConfigRead(missing)) if missing == path
    );
}

#[test]
fn malformed_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("places.json");
    fs::write(&path, "{ years: ").unwrap();

    assert_matches!(
        ConfigLoader::resolve(path.to_str(), &DatasetRegistry::builtin()),
        Err(PlacesError::ConfigParse(_))
    );
}

#[test]
fn unregistered_year_is_rejected() {
    let config = Config {
        years: Some(vec![2024, 1999]),
        ..Default::default()
    };

    assert_matches!(
        ConfigLoader::resolve_config(config, &DatasetRegistry::builtin()),
        Err(PlacesError::InvalidYear(1999))
    );
}
