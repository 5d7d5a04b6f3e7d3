use aotboot_rt::config::{CONFIG_ENV, LOG_ENV};
use aotboot_rt::{BootConfig, ConfigError, FaultStream};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_the_file_named_by_the_environment() {
    let file = config_file(
        r#"
[logging]
filter = "aotboot_rt=debug"
timestamps = true

[diagnostics]
stream = "stderr"
"#,
    );
    let path = file.path().to_string_lossy().into_owned();

    let config = BootConfig::from_lookup(|key| (key == CONFIG_ENV).then(|| path.clone())).unwrap();
    assert_eq!(config.logging.filter, "aotboot_rt=debug");
    assert!(config.logging.timestamps);
    assert_eq!(config.diagnostics.stream, FaultStream::Stderr);
}

#[test]
fn log_override_wins_over_the_file() {
    let file = config_file("[logging]\nfilter = \"info\"\n");
    let path = file.path().to_string_lossy().into_owned();

    let config = BootConfig::from_lookup(|key| match key {
        CONFIG_ENV => Some(path.clone()),
        LOG_ENV => Some("trace".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.logging.filter, "trace");
}

#[test]
fn no_variables_means_defaults() {
    let config = BootConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config, BootConfig::default());
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = BootConfig::load(&missing).unwrap_err();
    match err {
        ConfigError::Read { path, .. } => assert_eq!(path, missing),
        other => panic!("expected a read error, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = config_file("[logging\nfilter = ");
    let err = BootConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
