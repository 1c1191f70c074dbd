use std::path::PathBuf;

use ovo_scene::config::{ConfigError, EngineConfig, MAX_HARDWARE_LIGHTS};

#[test]
fn should_default_every_field_for_empty_document() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.max_lights, MAX_HARDWARE_LIGHTS);
    assert_eq!(config.texture_dir, PathBuf::from("texture"));
    assert_eq!(config.log_filter, None);
}

#[test]
fn should_parse_partial_document() {
    let config = EngineConfig::from_toml_str(
        r#"
        max_lights = 3
        log_filter = "ovo_scene=debug"
        "#,
    )
    .unwrap();
    assert_eq!(config.max_lights, 3);
    assert_eq!(config.texture_dir, PathBuf::from("texture"));
    assert_eq!(config.log_filter.as_deref(), Some("ovo_scene=debug"));
}

#[test]
fn should_reject_light_budget_outside_hardware_range() {
    assert!(matches!(
        EngineConfig::from_toml_str("max_lights = 0"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        EngineConfig::from_toml_str("max_lights = 9"),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn should_report_malformed_toml() {
    assert!(matches!(
        EngineConfig::from_toml_str("max_lights = "),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        EngineConfig::from_toml_str("max_lights = \"many\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn should_survive_serialization() {
    let config = EngineConfig {
        max_lights: 5,
        texture_dir: PathBuf::from("assets/tex"),
        log_filter: Some("info".to_string()),
    };
    let text = config.to_toml_string().unwrap();
    assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn should_load_from_toml_file_only() {
    let dir = std::env::temp_dir();
    let toml_path = dir.join(format!("ovo-config-test-{}.toml", std::process::id()));
    std::fs::write(&toml_path, "texture_dir = \"maps\"\n").unwrap();
    let loaded = EngineConfig::load_from_file(&toml_path);
    std::fs::remove_file(&toml_path).unwrap();
    assert_eq!(loaded.unwrap().texture_dir, PathBuf::from("maps"));

    assert!(matches!(
        EngineConfig::load_from_file(dir.join("engine.json")),
        Err(ConfigError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        EngineConfig::load_from_file(dir.join("ovo-config-missing.toml")),
        Err(ConfigError::Io(_))
    ));
}
