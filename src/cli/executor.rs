//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{ProvidersCommandHandler, SendCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, settings::Settings};
use crate::error::AppResult;

/// Execute a CLI command with the given settings
///
/// No subcommand means `serve` with the loaded configuration.
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> AppResult<()> {
    warn_on_serve_args(cli);

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings, environment)
                .execute(*dry_run)
                .await
        }
        None => {
            ServeCommandHandler::new(settings, environment)
                .execute(false)
                .await
        }
        Some(Commands::Send {
            notification_type,
            to,
            subject,
            message,
            data,
        }) => {
            SendCommandHandler::new(&settings)?
                .execute(
                    notification_type,
                    to,
                    subject.as_deref(),
                    message,
                    data.clone(),
                )
                .await
                .map(|_| ())
        }
        Some(Commands::Providers) => ProvidersCommandHandler::new(settings).execute(),
    }
}

fn warn_on_serve_args(cli: &Cli) {
    if let Some(Commands::Serve {
        host: Some(host),
        port: Some(port),
        ..
    }) = &cli.command
    {
        if *port < 1024 && host == "0.0.0.0" {
            eprintln!(
                "Warning: Binding to 0.0.0.0 on port {} requires root privileges",
                port
            );
        }
    }
}
