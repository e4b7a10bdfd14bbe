//! Configuration loading, validation, and persistence.

use vocalis_cli::config::{
    Config, ConfigService, ProductionConfigService, TestConfigService,
};

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[general]
worker_count = 2
analyzer_timeout_ms = 5000

[transcriber]
model = "whisper-large"
"#,
    )
    .unwrap();

    let service = ProductionConfigService::with_config_file(path);
    let config = service.get_config().unwrap();
    assert_eq!(config.general.worker_count, 2);
    assert_eq!(config.general.analyzer_timeout_ms, 5000);
    assert_eq!(config.transcriber.model, "whisper-large");
    // Untouched sections keep defaults.
    assert_eq!(config.analysis.gender_hint_default, "auto");
}

#[test]
fn unknown_keys_are_rejected_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[general]\nturbo_mode = true\n").unwrap();

    let service = ProductionConfigService::with_config_file(path);
    assert!(service.get_config().is_err());
}

#[test]
fn invalid_weights_are_rejected_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[analysis.weights]
timing = 1.0
"#,
    )
    .unwrap();

    let service = ProductionConfigService::with_config_file(path);
    let err = service.get_config().unwrap_err();
    assert!(err.to_string().contains("weights"));
}

#[test]
fn save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let service = ProductionConfigService::with_config_file(path.clone());

    let mut config = service.get_config().unwrap();
    config.transcriber.language = "de".to_string();
    service.save_config(&config).unwrap();

    let fresh = ProductionConfigService::with_config_file(path);
    assert_eq!(fresh.get_config().unwrap().transcriber.language, "de");
}

#[test]
fn set_value_helpers_enforce_validation() {
    use vocalis_cli::commands::config_command::{get_value, set_value};

    let mut config = Config::default();
    set_value(&mut config, "transcriber.model", "whisper-large-v3").unwrap();
    assert_eq!(
        get_value(&config, "transcriber.model").unwrap(),
        "whisper-large-v3"
    );

    // A weight change that breaks the sum invariant is rejected.
    assert!(set_value(&mut config, "analysis.weights.prosody", "0.99").is_err());
    // An out-of-range tie break is rejected.
    assert!(set_value(&mut config, "analysis.gender_tie_break", "7.5").is_err());
}

#[test]
fn test_service_isolates_configuration() {
    let service = TestConfigService::with_defaults();
    let mut config = service.get_config().unwrap();
    config.general.worker_count = 1;
    service.save_config(&config).unwrap();
    assert_eq!(service.get_config().unwrap().general.worker_count, 1);

    // A second service instance is unaffected.
    let other = TestConfigService::with_defaults();
    assert_ne!(other.get_config().unwrap().general.worker_count, 0);
}
