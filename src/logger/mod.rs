//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output in Full, Compact or JSON format

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use writer::open_log_file;

/// Initialize the global logger with the given configuration
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match (config.console.enabled, config.file.enabled) {
        (true, true) => init_both(&config, filter)?,
        (true, false) => init_console_only(&config.console, filter)?,
        (false, true) => init_file_only(&config.file, filter)?,
        (false, false) => anyhow::bail!("At least one output (console or file) must be enabled"),
    }

    Ok(())
}

fn use_ansi(config: &ConsoleConfig) -> bool {
    config.colored && std::io::stdout().is_terminal()
}

fn init_console_only(config: &ConsoleConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(use_ansi(config))
                .with_target(true)
                .with_level(true),
        )
        .try_init()?;
    Ok(())
}

fn init_file_only(config: &FileConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let writer = open_log_file(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Full => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer),
            )
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .try_init()?,
    }

    Ok(())
}

fn init_both(config: &LoggerConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let writer = open_log_file(&config.file)?;
    let ansi = use_ansi(&config.console);

    // The file layer goes first: span fields are formatted by the first
    // layer, and ANSI codes would otherwise end up in the file.
    // See: https://github.com/tokio-rs/tracing/issues/1817
    match config.file.format {
        LogFormat::Full => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer),
            )
            .with(
                fmt::layer()
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_level(true),
            )
            .try_init()?,
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .with(
                fmt::layer()
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_level(true),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .with(
                fmt::layer()
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_level(true),
            )
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn test_console_and_file_outputs_together() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notifier.log");
        let config = LoggerConfig {
            console: ConsoleConfig::new(true, false),
            file: FileConfig::new(true, path.clone(), false, LogFormat::Json).unwrap(),
            level: "info".to_string(),
        };

        init_logger(config).unwrap();
        tracing::warn!(marker = "both-outputs", "logger initialized");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("both-outputs"));
        assert!(!written.contains('\u{1b}'));
    }
}
