//! Configuration loading tests
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate QMRI_* or XDG_CONFIG_HOME are marked with #[serial].

use qmri_common::config::{
    ConfigResolver, DuplicatePolicy, TomlConfig, CONFIG_ENV_VAR, DERIVATIVES_ENV_VAR,
    SOURCEDATA_ENV_VAR,
};
use qmri_common::{Error, ErrorKind};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
sourcedata = "/data/sourcedata"
derivatives = "/data/derivatives"
subjects = ["01", "02"]
session = "1"
acquisition = "mp2rage"

[index]
duplicate_sidecars = "first_match"
attach_b1_map = false
ignore_patterns = ["derivatives"]

[logging]
level = "debug"
file = "/tmp/qmri.log"
"#;

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(SOURCEDATA_ENV_VAR);
    env::remove_var(DERIVATIVES_ENV_VAR);
}

#[test]
fn test_full_config_parses() {
    let config = TomlConfig::from_toml_str(FULL_CONFIG).unwrap();

    assert_eq!(config.sourcedata, PathBuf::from("/data/sourcedata"));
    assert_eq!(config.derivatives, PathBuf::from("/data/derivatives"));
    assert_eq!(config.subjects, vec!["01", "02"]);
    assert_eq!(config.session.as_deref(), Some("1"));
    assert_eq!(config.acquisition, "mp2rage");
    assert_eq!(config.index.duplicate_sidecars, DuplicatePolicy::FirstMatch);
    assert!(!config.index.attach_b1_map);
    assert_eq!(config.index.ignore_patterns, vec!["derivatives"]);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/qmri.log")));
}

#[test]
fn test_partial_index_section_keeps_defaults() {
    let config = TomlConfig::from_toml_str("[index]\nattach_b1_map = false\n").unwrap();
    assert_eq!(config.index.duplicate_sidecars, DuplicatePolicy::Reject);
    assert_eq!(
        config.index.ignore_patterns,
        vec!["derivatives", "sourcedata", "code", "stimuli"]
    );
}

#[test]
fn test_unknown_policy_rejected() {
    let err = TomlConfig::from_toml_str("[index]\nduplicate_sidecars = \"newest\"\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_load_reports_path_on_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    fs::write(&path, "subjects = [").unwrap();

    match TomlConfig::load(&path).unwrap_err() {
        Error::Config(message) => assert!(message.contains("broken.toml")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_logging_section_typo_rejected() {
    let err = TomlConfig::from_toml_str("[logging]\nlevel = \"debug\"\nfiel = \"/tmp/x.log\"\n")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_invalid_session_label_rejected() {
    let err = TomlConfig::from_toml_str("session = \"ses-1\"").unwrap_err();
    assert!(matches!(err, Error::Config(ref m) if m.contains("ses-1")));
}

#[test]
#[serial]
fn test_resolver_loads_file_from_env_var() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, FULL_CONFIG).unwrap();
    env::set_var(CONFIG_ENV_VAR, &path);

    let resolver = ConfigResolver::new("qmri-test");
    assert_eq!(resolver.candidate_paths()[0], path);

    let config = resolver.resolve().unwrap();
    assert_eq!(config.subjects, vec!["01", "02"]);

    clear_env();
}

#[test]
#[serial]
fn test_resolver_missing_env_file_is_error() {
    clear_env();
    let temp = TempDir::new().unwrap();
    env::set_var(CONFIG_ENV_VAR, temp.path().join("absent.toml"));

    let err = ConfigResolver::new("qmri-test").resolve().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    clear_env();
}

#[test]
#[serial]
fn test_resolver_env_overrides_roots() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, FULL_CONFIG).unwrap();
    env::set_var(CONFIG_ENV_VAR, &path);
    env::set_var(SOURCEDATA_ENV_VAR, "/override/sourcedata");
    env::set_var(DERIVATIVES_ENV_VAR, "/override/derivatives");

    let config = ConfigResolver::new("qmri-test").resolve().unwrap();
    assert_eq!(config.sourcedata, PathBuf::from("/override/sourcedata"));
    assert_eq!(config.derivatives, PathBuf::from("/override/derivatives"));
    assert_eq!(config.acquisition, "mp2rage");

    clear_env();
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_resolver_platform_config_and_defaults() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", temp.path());

    // Nothing under the config dir: defaults
    let resolver = ConfigResolver::new("qmri-test-nonexistent-app");
    let config = resolver.resolve().unwrap();
    assert_eq!(config.sourcedata, PathBuf::from("/sourcedata"));
    assert!(config.subjects.is_empty());

    // Platform file is picked up once it exists
    let app_dir = temp.path().join("qmri-test-nonexistent-app");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(app_dir.join("config.toml"), "subjects = [\"07\"]\n").unwrap();
    let config = resolver.resolve().unwrap();
    assert_eq!(config.subjects, vec!["07"]);

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }
}
