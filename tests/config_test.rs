//! Integration tests for Settings loading with layered precedence.
//!
//! These tests use temp directories for the local layer only, so they see
//! compiled defaults underneath.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use guidetree::config::{local_config_path, Settings};

#[test]
fn given_no_local_config_when_load_then_returns_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.action_space, 32);
    assert_eq!(settings.episodes, 100);
    assert_eq!(settings.read_timeout_secs, 5);
}

#[test]
fn given_local_config_when_load_then_overrides_only_given_fields() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "action_space = 8\nstate_dict = \"states.toml\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.action_space, 8);
    assert_eq!(settings.state_dict, PathBuf::from("states.toml"));
    assert_eq!(settings.episodes, 100, "untouched field keeps its default");
}

#[test]
fn given_zero_action_space_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "action_space = 0\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(result.is_err(), "action_space 0 must be rejected");
}

#[test]
fn given_zero_explore_steps_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "explore_steps = 0\n").unwrap();

    assert!(Settings::load(Some(dir.path())).is_err());
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "episodes = [not toml").unwrap();

    assert!(Settings::load(Some(dir.path())).is_err());
}

#[test]
fn given_settings_when_to_toml_then_loads_back_identically() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        action_space: 4,
        episodes: 7,
        state_dict: PathBuf::from("custom.toml"),
        read_timeout_secs: 2,
        iterations: 12,
        explore_steps: 3,
    };
    fs::write(local_config_path(dir.path()), settings.to_toml().unwrap()).unwrap();

    let loaded = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(loaded, settings);
}

#[test]
fn given_template_when_parsed_then_is_valid_toml() {
    let template = Settings::template();

    let parsed: Result<toml::Value, _> = toml::from_str(&template);

    assert!(parsed.is_ok(), "template must be valid TOML:\n{template}");
}
