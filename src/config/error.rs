//! Errors raised while locating, parsing or validating configuration

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required configuration file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is out of range or malformed
    #[error("Invalid value for {field}: {message}")]
    ValidationError {
        /// Dotted key of the offending setting, e.g. `server.port`
        field: String,
        message: String,
    },

    /// A channel names a provider that does not exist for it
    #[error(
        "Unknown provider '{name}' for channels.{channel}.provider; supported: {}",
        .supported.join(", ")
    )]
    UnknownProvider {
        channel: &'static str,
        name: String,
        supported: &'static [&'static str],
    },

    #[error(
        "Unknown environment '{0}'; expected development, test, staging or production"
    )]
    UnknownEnvironment(String),

    /// Both a configuration directory and a single file were requested
    #[error(
        "{dir_var} and {file_var} cannot both be set; use the directory for layered \
         configuration or the file for a single configuration file"
    )]
    ConflictingSources {
        dir_var: &'static str,
        file_var: &'static str,
    },

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Dotted key of the setting at fault, when one is known
    pub fn key(&self) -> Option<String> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field.clone()),
            ConfigError::UnknownProvider { channel, .. } => {
                Some(format!("channels.{}.provider", channel))
            }
            _ => None,
        }
    }
}
