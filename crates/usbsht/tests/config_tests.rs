//! Integration tests for configuration loading
//!
//! Tests config parsing, defaults for missing sections, validation, and
//! save/load through the filesystem.

use std::time::Duration;
use usbsht::config::{SensorConfig, load_config};

const FULL_CONFIG: &str = r#"
[device]
vendor_id = "0x1234"
product_id = "0xabcd"
timeout_ms = 250
configuration = 2

[echo]
iterations = 500

[logging]
level = "debug"
"#;

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, FULL_CONFIG);

    let config = SensorConfig::load(Some(path)).unwrap();
    assert_eq!(config.vendor_id().unwrap(), 0x1234);
    assert_eq!(config.product_id().unwrap(), 0xabcd);
    assert_eq!(config.timeout(), Duration::from_millis(250));
    assert_eq!(config.device.configuration, 2);
    assert_eq!(config.echo.iterations, 500);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_missing_sections_use_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[echo]\niterations = 10\n");

    let config = SensorConfig::load(Some(path)).unwrap();
    assert_eq!(config.vendor_id().unwrap(), 0x16c0);
    assert_eq!(config.product_id().unwrap(), 0x05dc);
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.device.configuration, 1);
    assert_eq!(config.echo.iterations, 10);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_empty_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "");

    let config = SensorConfig::load(Some(path)).unwrap();
    assert_eq!(config.echo.iterations, 100);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let path = write_config(&dir, "[device]\nvendor_id = \"16c0\"\n");
    assert!(SensorConfig::load(Some(path)).is_err());

    let path = write_config(&dir, "[device]\ntimeout_ms = 0\n");
    assert!(SensorConfig::load(Some(path)).is_err());

    let path = write_config(&dir, "[logging]\nlevel = \"loud\"\n");
    assert!(SensorConfig::load(Some(path)).is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[device\nvendor_id = ");
    let err = SensorConfig::load(Some(path)).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
}

#[test]
fn test_missing_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(SensorConfig::load(Some(path)).is_err());
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = SensorConfig::default();
    config.echo.iterations = 42;
    config.device.vendor_id = "0x0001".to_string();
    config.save(&path).unwrap();

    let loaded = load_config(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded.echo.iterations, 42);
    assert_eq!(loaded.vendor_id().unwrap(), 1);
}

#[test]
fn test_standard_location_errors_propagate() {
    let dir = tempfile::tempdir().unwrap();
    // Only this test touches the environment in this binary
    unsafe { std::env::set_var("XDG_CONFIG_HOME", dir.path()) };

    if !std::path::Path::new("/etc/usbsht/config.toml").exists() {
        let config = SensorConfig::load_or_default().unwrap();
        assert_eq!(config.vendor_id().unwrap(), 0x16c0);
    }

    let config_dir = dir.path().join("usbsht");
    std::fs::create_dir_all(&config_dir).unwrap();
    let path = config_dir.join("config.toml");

    std::fs::write(&path, "[device]\nvendor_id = \"0x1234\"\nproduct_id = \"nothex\"\n").unwrap();
    assert_eq!(SensorConfig::find_path(), Some(path.clone()));
    let err = SensorConfig::load_or_default().unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid PID 'nothex'"));

    std::fs::write(&path, "[device\n").unwrap();
    let err = SensorConfig::load_or_default().unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));

    std::fs::write(&path, "[device]\nvendor_id = \"0x1234\"\n").unwrap();
    let config = SensorConfig::load_or_default().unwrap();
    assert_eq!(config.vendor_id().unwrap(), 0x1234);
}
