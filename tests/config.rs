use saint_sync::config::{Config, SheetsConfig};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.server.bind_address, "127.0.0.1:3000");
    assert_eq!(config.sheets.client_type, "google");
    assert_eq!(config.sheets.credentials_env, "GOOGLE_APPLICATION_CREDENTIALS");
    assert_eq!(config.sync.preview_delay_ms, 1000);
    assert_eq!(config.sync.sync_delay_ms, 2000);
    assert_eq!(config.sync.export_record_delay_ms, 100);
    assert_eq!(config.sync.preview_batch_size, 3);
    assert!(config.sync.require_business_keys);
    assert!(!config.logging.enabled);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    // Valid config should pass
    assert!(config.validate().is_ok());

    // Invalid bind address should fail
    config.server.bind_address = "localhost".to_string();
    assert!(config.validate().is_err());

    // Reset and test an empty preview batch
    config.server.bind_address = "0.0.0.0:8080".to_string();
    config.sync.preview_batch_size = 0;
    assert!(config.validate().is_err());

    config.sync.preview_batch_size = 3;
    config.sheets.client_type = "excel".to_string();
    assert!(config.validate().is_err());

    config.sheets.client_type = "memory".to_string();
    config.logging.level = "chatty".to_string();
    assert!(config.validate().is_err());

    config.logging.level = "debug".to_string();
    config.sync.sync_delay_ms = 60_001;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("bind_address = \"127.0.0.1:3000\""));
    assert!(toml_str.contains("sync_delay_ms = 2000"));
    assert!(toml_str.contains("require_business_keys = true"));
}

#[test]
fn test_partial_config_deserialization() {
    // Test that partial TOML configs merge with defaults
    let partial_toml = r#"
[sync]
sync_delay_ms = 500
require_business_keys = false

[logging]
enabled = true
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    // Check that specified values are used
    assert_eq!(config.sync.sync_delay_ms, 500);
    assert!(!config.sync.require_business_keys);
    assert!(config.logging.enabled);

    // Check that unspecified values use defaults
    assert_eq!(config.sync.preview_delay_ms, 1000);
    assert_eq!(config.sync.preview_batch_size, 3);
    assert_eq!(config.sheets.client_type, "google");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_empty_config_deserialization() {
    // Test that empty TOML uses all defaults
    let config: Config = toml::from_str("").unwrap();
    let default_config = Config::default();

    assert_eq!(config.server.bind_address, default_config.server.bind_address);
    assert_eq!(config.database.url, default_config.database.url);
    assert_eq!(config.sync.sync_delay_ms, default_config.sync.sync_delay_ms);
    assert_eq!(config.logging.enabled, default_config.logging.enabled);
}

#[test]
fn test_load_from_file_and_generate_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Config::generate_default_config(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# Saint Sync Configuration File"));

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.sync.preview_batch_size, 3);
}

#[test]
fn test_load_from_file_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[sync]\npreview_batch_size = 0").unwrap();
    assert!(Config::load_from_file(file.path()).is_err());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[sync\nbroken").unwrap();
    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_credentials_path_prefers_config_file() {
    let config = SheetsConfig {
        credentials_path: Some(PathBuf::from("/etc/saint-sync/key.json")),
        credentials_env: "SAINT_SYNC_TEST_CREDENTIALS_UNUSED".to_string(),
        ..SheetsConfig::default()
    };
    assert_eq!(
        config.resolve_credentials_path(),
        Some(PathBuf::from("/etc/saint-sync/key.json"))
    );

    let config = SheetsConfig {
        credentials_env: "SAINT_SYNC_TEST_CREDENTIALS_NEVER_SET".to_string(),
        ..SheetsConfig::default()
    };
    assert_eq!(config.resolve_credentials_path(), None);
}
