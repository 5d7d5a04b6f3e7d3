use aotboot_rt::ConfigError;
use miette::Diagnostic;
use thiserror::Error;

/// CLI-specific error type that provides rich diagnostics
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Failed to load configuration")]
    #[diagnostic(
        code(aotboot::cli::config_error),
        help("check the file's TOML syntax, or unset AOTBOOT_CONFIG to use the defaults")
    )]
    Config {
        #[source]
        source: ConfigError,
    },

    #[error("Failed to render {what} as TOML")]
    #[diagnostic(code(aotboot::cli::render_error))]
    Render {
        what: &'static str,
        #[source]
        source: toml::ser::Error,
    },
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        CliError::Config { source }
    }
}
