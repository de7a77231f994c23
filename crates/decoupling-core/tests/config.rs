use std::path::Path;

use decoupling_core::config::ConfigError;
use decoupling_core::ValidationConfig;

#[test]
fn shipped_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/validation.toml");
    let config = ValidationConfig::load(&path).unwrap();
    assert_eq!(config, ValidationConfig::default());
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ValidationConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = ValidationConfig::from_toml_str("panel_rows = [").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let err = ValidationConfig::from_toml_str("correlation_threshold = 1.5").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
