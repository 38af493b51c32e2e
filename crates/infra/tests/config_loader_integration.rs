//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use diradmin_domain::DirAdminError;
use diradmin_infra::config;
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    (temp_file, path)
}

#[test]
fn test_load_full_toml_config() {
    let (_temp, path) = write_config(
        r#"
work_dir = "/var/lib/diradmin"
default_domain = "example.com"

[api]
base_url = "https://admin.example.test"
token_url = "https://oauth.example.test/token"
timeout_secs = 10
user_agent = "diradmin-test"

[retry]
max_attempts = 4
base_delay_ms = 250
max_delay_ms = 8000

[scan]
page_size = 200
checkpoint_every = 5
"#,
        "toml",
    );

    let config = config::load_from_file(&path).expect("config should load");

    assert_eq!(config.work_dir, PathBuf::from("/var/lib/diradmin"));
    assert_eq!(config.default_domain.as_deref(), Some("example.com"));
    assert_eq!(config.api.base_url, "https://admin.example.test");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.retry.max_delay_ms, 8000);
    assert_eq!(config.scan.page_size, 200);
    assert_eq!(config.scan.checkpoint_every, 5);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_explicit_json_config_goes_through_load() {
    let (_temp, path) = write_config(r#"{ "scan": { "checkpoint_every": 3 } }"#, "json");

    let config = config::load(Some(path.clone())).expect("config should load");
    assert_eq!(config.scan.checkpoint_every, 3);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_unknown_extension_is_rejected() {
    let (_temp, path) = write_config("checkpoint_every: 3", "yaml");

    let result = config::load_from_file(&path);
    assert!(matches!(result, Err(DirAdminError::Config(ref m)) if m.contains("yaml")));

    std::fs::remove_file(path).ok();
}
