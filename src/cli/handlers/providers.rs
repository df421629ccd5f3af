//! Providers command handler
//!
//! Shows which provider each channel selects and what actually got wired.

use std::fmt;

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::notifications::{Channel, ProviderRegistry};
use crate::server::build_notification_service;

/// One row of the providers listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRow {
    pub channel: &'static str,
    pub notification_type: &'static str,
    pub configured: Option<String>,
    pub wired: Option<&'static str>,
}

/// Channel activation summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidersReport {
    pub rows: Vec<ChannelRow>,
}

impl ProvidersReport {
    fn build(settings: &Settings, registry: &ProviderRegistry) -> Self {
        let rows = Channel::ALL
            .into_iter()
            .map(|channel| ChannelRow {
                channel: channel.config_name(),
                notification_type: channel.type_tag(),
                configured: channel
                    .settings(&settings.channels)
                    .active_provider()
                    .map(str::to_string),
                wired: registry.resolve(channel.type_tag()).map(|p| p.name()),
            })
            .collect();
        Self { rows }
    }

    /// Number of channels with a wired provider
    pub fn active_count(&self) -> usize {
        self.rows.iter().filter(|row| row.wired.is_some()).count()
    }
}

impl fmt::Display for ProvidersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:<10} {:<12} STATUS", "CHANNEL", "TYPE", "PROVIDER")?;
        for row in &self.rows {
            let status = match row.wired {
                Some(name) => format!("active ({})", name),
                None => "inactive".to_string(),
            };
            writeln!(
                f,
                "{:<10} {:<10} {:<12} {}",
                row.channel,
                row.notification_type,
                row.configured.as_deref().unwrap_or("-"),
                status
            )?;
        }
        write!(f, "{} of {} channels active", self.active_count(), self.rows.len())
    }
}

/// Handler for the providers command
pub struct ProvidersCommandHandler {
    config: Settings,
}

impl ProvidersCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Wire the configured providers and describe the result
    ///
    /// # Errors
    /// Fails the same way server startup would: an active provider with a
    /// missing setting is a configuration error.
    pub fn report(&self) -> AppResult<ProvidersReport> {
        let service = build_notification_service(&self.config)?;
        Ok(ProvidersReport::build(&self.config, service.registry()))
    }

    pub fn execute(&self) -> AppResult<()> {
        println!("{}", self.report()?);
        Ok(())
    }
}
