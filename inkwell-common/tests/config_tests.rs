//! Integration tests for configuration loading
//!
//! Tests that manipulate process environment are marked with #[serial]
//! so they run sequentially, not in parallel.

use inkwell_common::config::{InkwellConfig, ENV_API_KEY, ENV_DATABASE, ENV_PORT};
use inkwell_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(ENV_API_KEY);
    env::remove_var(ENV_DATABASE);
    env::remove_var(ENV_PORT);
}

#[test]
#[serial]
fn test_load_reads_explicit_toml_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inkwell.toml");
    std::fs::write(
        &path,
        r#"
        [capability]
        api_key = "sk-from-file"

        [store]
        database_path = "/var/lib/inkwell/journal.db"
        "#,
    )
    .unwrap();

    let config = InkwellConfig::load(Some(&path)).unwrap();

    assert_eq!(config.api_key(), Some("sk-from-file"));
    assert_eq!(
        config.store.database_path,
        PathBuf::from("/var/lib/inkwell/journal.db")
    );
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_environment_wins_over_toml() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inkwell.toml");
    std::fs::write(
        &path,
        r#"
        [capability]
        api_key = "sk-from-file"

        [server]
        port = 4000
        "#,
    )
    .unwrap();

    env::set_var(ENV_API_KEY, "sk-from-env");
    env::set_var(ENV_PORT, "5050");

    let config = InkwellConfig::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.api_key(), Some("sk-from-env"));
    assert_eq!(config.server.port, 5050);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    assert!(matches!(
        InkwellConfig::load(Some(&missing)),
        Err(Error::Config(_))
    ));
}

#[test]
#[serial]
fn test_malformed_toml_is_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inkwell.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    assert!(matches!(InkwellConfig::load(Some(&path)), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_absent_key_fails_validation() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inkwell.toml");
    std::fs::write(&path, "[server]\nport = 3001\n").unwrap();

    let config = InkwellConfig::load(Some(&path)).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains(ENV_API_KEY));
}
