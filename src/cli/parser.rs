//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// Notification dispatcher with pluggable delivery providers
#[derive(Parser, Debug)]
#[command(name = "notifier-rs")]
#[command(about = "Notification dispatcher with pluggable delivery providers")]
#[command(long_about = "
notifier-rs routes notifications (email, SMS, push, WhatsApp, Telegram) to the
delivery provider configured for each channel. It runs as an HTTP API or sends
single notifications from the command line.

EXAMPLES:
    # Start the server with default configuration
    notifier-rs serve

    # Start server on custom host and port
    notifier-rs serve --host 0.0.0.0 --port 8080

    # Check configuration and provider wiring without starting the server
    notifier-rs serve --dry-run

    # Use custom configuration file
    notifier-rs --config /path/to/config.toml serve

    # Send one SMS
    notifier-rs send --type SMS --to +15550100 --message 'Build passed'

    # Send a Telegram message with extra Bot API fields
    notifier-rs send -t TELEGRAM --to 123456 -m hello --data '{\"disable_notification\":true}'

    # Show which providers the configuration activates
    notifier-rs --env production providers
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered `config/` directory.
    /// `NOTIFIER_*` environment variables still override its values.
    ///
    /// Example: --config /etc/notifier-rs/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` is layered over `default.toml`.
    /// Takes precedence over `NOTIFIER_APP_ENV`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level.
    /// Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only.
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API (default)
    ///
    /// Wires the configured providers and serves the notification endpoints.
    ///
    /// Examples:
    ///   notifier-rs serve                           # Start with defaults
    ///   notifier-rs serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   notifier-rs serve --dry-run                 # Validate config and wiring only
    Serve {
        /// Host address to bind to
        ///
        /// Use 127.0.0.1 for localhost only, or 0.0.0.0 to accept connections from any interface.
        ///
        /// Default: 127.0.0.1
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Default: 3000
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Overrides both the configuration file and the global --verbose/--quiet flags.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and provider wiring, then exit
        ///
        /// Returns exit code 0 if every active provider could be constructed.
        #[arg(long)]
        dry_run: bool,
    },

    /// Send a single notification
    ///
    /// Builds the same dispatcher as the server and sends one notification.
    /// Exits non-zero if the notification is invalid, unsupported or fails.
    ///
    /// Examples:
    ///   notifier-rs send -t EMAIL --to a@example.com -s Hello -m 'Hi there'
    ///   notifier-rs send -t PUSH --to <device-token> -s Alert -m 'Disk full'
    Send {
        /// Channel type: EMAIL, SMS, PUSH, WHATSAPP or TELEGRAM (any case)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        notification_type: String,

        /// Destination: email address, phone number, device token or chat id
        #[arg(long, value_name = "DESTINATION")]
        to: String,

        /// Email subject, push title or chat heading
        #[arg(short, long)]
        subject: Option<String>,

        /// Message body
        #[arg(short, long)]
        message: String,

        /// Provider-specific extras as a JSON object
        #[arg(long, value_name = "JSON", value_parser = super::validation::validate_json_object)]
        data: Option<JsonValue>,
    },

    /// List the providers the configuration activates
    ///
    /// Shows the configured provider for every channel, then wires them
    /// exactly as the server would and prints the resolution order.
    Providers,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
