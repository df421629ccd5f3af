//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    ChannelsConfig, FileSettings, HttpClientConfig, LoggerSettings, ServerConfig, Settings,
};
use crate::notifications::{Channel, should_activate};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    /// - Keep-alive timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl HttpClientConfig {
    /// Validate outbound HTTP client configuration
    ///
    /// # Validation Rules
    /// - Timeouts must be greater than 0
    /// - Connect timeout must not exceed the total timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::validation(
                "http.timeout",
                "HTTP timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "http.connect_timeout",
                "Connect timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout > self.timeout {
            return Err(ConfigError::ValidationError {
                field: "http.connect_timeout".to_string(),
                message: format!(
                    "Connect timeout ({}s) cannot exceed the total timeout ({}s).",
                    self.connect_timeout, self.timeout
                ),
            });
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl ChannelsConfig {
    /// Validate channel provider selection
    ///
    /// Only the provider names are checked here. Required provider settings
    /// are checked when the provider is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for channel in Channel::ALL {
            let settings = channel.settings(self);
            let Some(name) = settings.active_provider() else {
                continue;
            };

            let supported = channel.supported_providers();
            if !supported.iter().any(|s| should_activate(settings, s)) {
                return Err(ConfigError::UnknownProvider {
                    channel: channel.config_name(),
                    name: name.to_string(),
                    supported,
                });
            }
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.http.validate()?;
        self.logger.validate()?;
        self.channels.validate()?;
        Ok(())
    }
}
