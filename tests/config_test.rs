//! Integration tests for Settings config loading with layered precedence.
//!
//! Precedence: defaults < global < local file < EDGEBUNDLE_* env vars.
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;

use tempfile::TempDir;

use edgebundle::application::services::BundleOptions;
use edgebundle::application::ApplicationError;
use edgebundle::config::{local_config_path, Settings, LOCAL_CONFIG_FILE};

#[test]
fn given_local_config_when_load_then_overrides_only_given_fields() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(
        &path,
        r#"
delimiter = "/"
split_depth = 4
implicit_root = "flare"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.delimiter, "/");
    assert_eq!(settings.split_depth, 4);
    assert_eq!(settings.implicit_root.as_deref(), Some("flare"));
    assert_eq!(settings.width, 1000.0);
    assert!(settings.sort);
}

#[test]
fn given_local_config_when_deriving_bundle_options_then_radius_follows_width() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(LOCAL_CONFIG_FILE);
    fs::write(&path, "width = 600.0\nlabel_margin = 100.0\nsort = false\n").unwrap();

    // Act
    let settings = Settings::load(Some(&path)).unwrap();
    let options = BundleOptions::from(&settings);

    // Assert
    assert_eq!(options.radius, 200.0);
    assert!(!options.sort);
}

#[test]
fn given_split_depth_beyond_limit_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(&path, "split_depth = 40\n").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { message } if message.contains("split_depth")));
}

#[test]
fn given_malformed_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(&path, "split_depth = [\n").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_explicit_config_that_does_not_exist_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load(Some(&dir.path().join("absent.toml")));

    assert!(result.is_err());
}

#[test]
fn given_env_override_when_load_then_env_wins_over_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(&path, "beta = 0.3\n").unwrap();
    // Only this test touches beta, other tests load settings concurrently
    std::env::set_var("EDGEBUNDLE_BETA", "0.5");

    // Act
    let settings = Settings::load(Some(&path));
    std::env::remove_var("EDGEBUNDLE_BETA");

    // Assert
    assert_eq!(settings.unwrap().beta, 0.5);
}

#[test]
fn given_settings_when_rendering_toml_then_parses_back() {
    let settings = Settings {
        implicit_root: Some("flare".into()),
        ..Default::default()
    };

    let text = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&text).unwrap();

    assert_eq!(parsed, settings);
}
