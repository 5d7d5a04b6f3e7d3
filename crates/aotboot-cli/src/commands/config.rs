use crate::error::CliError;
use aotboot_rt::config::CONFIG_ENV;
use aotboot_rt::BootConfig;
use std::env;
use std::path::Path;

/// Resolves the configuration the host would boot with. An explicit file
/// replaces `AOTBOOT_CONFIG`; `AOTBOOT_LOG` still applies.
pub fn handle_config(file: Option<&Path>) -> Result<String, CliError> {
    let config = load(file, |key| env::var(key).ok())?;
    toml::to_string_pretty(&config).map_err(|source| CliError::Render {
        what: "configuration",
        source,
    })
}

fn load<F>(file: Option<&Path>, lookup: F) -> Result<BootConfig, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match file {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            let path = path.to_string_lossy().into_owned();
            BootConfig::from_lookup(|key| if key == CONFIG_ENV { Some(path.clone()) } else { lookup(key) })?
        }
        None => BootConfig::from_lookup(lookup)?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aotboot_rt::config::LOG_ENV;
    use aotboot_rt::FaultStream;
    use std::io::Write;

    #[test]
    fn explicit_file_replaces_the_environment_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diagnostics]\nstream = \"stderr\"").unwrap();

        let config = load(Some(file.path()), |key| match key {
            CONFIG_ENV => Some("/nonexistent/aotboot.toml".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.diagnostics.stream, FaultStream::Stderr);
    }

    #[test]
    fn log_override_applies_to_explicit_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = load(Some(file.path()), |key| (key == LOG_ENV).then(|| "debug".to_string())).unwrap();
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging = 3").unwrap();
        let err = load(Some(file.path()), |_| None).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }
}
