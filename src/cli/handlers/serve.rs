//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use crate::config::{Environment, settings::Settings};
use crate::error::AppResult;
use crate::server::{Server, build_notification_service};

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    /// Create a new serve command handler
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Provider wiring errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(&self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            self.validate_only()
        } else {
            Server::new(self.config.clone(), self.environment)
                .run()
                .await
                .map_err(Into::into)
        }
    }

    /// Validate configuration and wire providers without binding
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid ({})", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());

        let service = build_notification_service(&self.config)?;
        if service.registry().is_empty() {
            println!("! No provider is active; every notification would be rejected");
        } else {
            for provider in service.registry().iter() {
                println!(
                    "✓ Provider ready: {} ({})",
                    provider.name(),
                    provider.notification_type()
                );
            }
        }

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}
