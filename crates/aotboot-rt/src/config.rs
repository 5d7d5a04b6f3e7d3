use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Names a TOML file to load the bootstrap configuration from.
pub const CONFIG_ENV: &str = "AOTBOOT_CONFIG";
/// Overrides `logging.filter`.
pub const LOG_ENV: &str = "AOTBOOT_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bootstrap configuration. Every field has a default; an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub logging: LoggingConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter directives, e.g. `warn` or `aotboot_rt=debug`.
    pub filter: String,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_filter(),
            timestamps: false,
        }
    }
}

pub fn default_filter() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Where fault reports are printed.
    pub stream: FaultStream,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultStream {
    #[default]
    Stdout,
    Stderr,
}

impl FaultStream {
    pub fn writer(self) -> Box<dyn Write> {
        match self {
            FaultStream::Stdout => Box::new(io::stdout()),
            FaultStream::Stderr => Box::new(io::stderr()),
        }
    }
}

impl BootConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Loads from `AOTBOOT_CONFIG` when set, then applies `AOTBOOT_LOG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BootConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path))?,
            _ => Self::default(),
        };
        if let Some(filter) = lookup(LOG_ENV).filter(|f| !f.is_empty()) {
            config.logging.filter = filter;
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = BootConfig::from_toml_str("").unwrap();
        assert_eq!(config, BootConfig::default());
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.diagnostics.stream, FaultStream::Stdout);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = BootConfig::from_toml_str("[diagnostics]\nstream = \"stderr\"\n").unwrap();
        assert_eq!(config.diagnostics.stream, FaultStream::Stderr);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn unknown_stream_is_a_parse_error() {
        let err = BootConfig::from_toml_str("[diagnostics]\nstream = \"syslog\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn log_variable_overrides_filter() {
        let config = BootConfig::from_lookup(|key| match key {
            LOG_ENV => Some("aotboot_rt=trace".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.logging.filter, "aotboot_rt=trace");
    }

    #[test]
    fn serializes_back_to_toml() {
        let text = BootConfig::default().to_toml_string().unwrap();
        let reparsed = BootConfig::from_toml_str(&text).unwrap();
        assert_eq!(reparsed, BootConfig::default());
    }
}
