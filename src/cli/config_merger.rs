//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, settings::Settings};

/// Configuration merger that handles CLI argument integration with file-based configuration
///
/// CLI arguments override configuration file values, which override defaults.
#[derive(Debug)]
pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Load the base configuration the way the CLI asks for it
    ///
    /// `--config` switches the loader to single-file mode and `--env` replaces
    /// `NOTIFIER_APP_ENV`; without them the loader's own environment lookup applies.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }

        let environment = loader.environment();
        let base_config = loader.load()?;
        Ok(Self::new(base_config, environment))
    }

    /// Environment the base configuration was loaded for
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// # Returns
    /// A new Settings instance with CLI overrides applied and validated
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        Self::apply_global_overrides(&mut config, cli);

        if let Some(ref command) = cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_global_overrides(config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve {
                host,
                port,
                log_level,
                dry_run: _,
            } => {
                if let Some(host_addr) = host {
                    config.server.host = host_addr.clone();
                }

                if let Some(port_num) = port {
                    config.server.port = *port_num;
                }

                // Command-specific level wins over --verbose/--quiet
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
            }
            Commands::Send { .. } | Commands::Providers => {}
        }
    }

    /// Get the current configuration (useful for inspection)
    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
