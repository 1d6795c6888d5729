use appshell::config::{Config, LOG_LEVELS};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.ui.mouse_enabled);
    assert_eq!(config.ui.tick_rate_ms, 250);
    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
    assert!(config.device.desktop);
    assert_eq!(config.app_params()["panel"]["visibleBreakpoint"], json!(160));
}

#[test]
fn test_every_listed_level_validates() {
    for level in LOG_LEVELS {
        let mut config = Config::default();
        config.logging.level = level.to_uppercase();
        assert!(config.validate().is_ok(), "{} should be accepted", level);
    }
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = Config::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.params.insert("theme".to_string(), json!("windows"));
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Invalid theme"));

    let mut config = Config::default();
    config.ui.tick_rate_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appshell.toml");
    fs::write(
        &path,
        r#"
[logging]
level = "debug"

[params]
theme = "md"

[params.panel]
side = "right"
width = 24
"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();

    assert_eq!(config.logging.level_filter(), log::LevelFilter::Debug);
    assert_eq!(config.ui.tick_rate_ms, 250);
    assert_eq!(config.params["theme"], json!("md"));
    assert_eq!(config.params["panel"]["width"], json!(24));
    // A [params] table replaces the default params wholesale
    assert!(config.params.get("autoDarkTheme").is_none());
}

#[test]
fn test_invalid_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[ui\nmouse_enabled = maybe").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.toml"));

    let missing = dir.path().join("missing.toml");
    assert!(Config::load_from_file(missing).is_err());
}

#[test]
fn test_file_with_bad_level_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appshell.toml");
    fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();
    assert!(Config::load_from_file(&path).is_err());
}

#[test]
fn test_generated_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Config::generate_default_config(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# appshell configuration file"));

    let config = Config::load_from_file(&path).unwrap();
    let defaults = Config::default();
    assert_eq!(config.params, defaults.params);
    assert_eq!(config.ui.tick_rate_ms, defaults.ui.tick_rate_ms);
    assert_eq!(config.logging.level, defaults.logging.level);
}

#[test]
fn test_default_config_path_ends_with_app_dir() {
    if let Ok(path) = Config::get_default_config_path() {
        assert!(path.ends_with("appshell/config.toml"));
    }
}
