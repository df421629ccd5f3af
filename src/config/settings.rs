//! Configuration settings structures for notifier-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "notifier-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive_timeout() -> u64 {
    75
}

fn default_http_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_pool_max_idle_per_host() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/notifier.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            keep_alive_timeout: default_keep_alive_timeout(),
        }
    }
}

// ============================================================================
// Outbound HTTP Client Configuration
// ============================================================================

/// Settings for the `reqwest::Client` shared by all providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Total request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Idle connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// User-Agent header; defaults to `notifier-rs/<version>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
            connect_timeout: default_connect_timeout(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: None,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level or filter directive: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to the runtime LoggerConfig
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = self.console.into_console_config();
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl ConsoleSettings {
    pub fn into_console_config(self) -> ConsoleConfig {
        ConsoleConfig::new(self.enabled, self.colored)
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.parse_format()?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(
            |e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            },
        )
    }

    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Channel Configuration
// ============================================================================

/// Provider selection and provider settings for one channel
///
/// ```toml
/// [channels.sms]
/// provider = "twilio"
///
/// [channels.sms.providers.twilio]
/// account_sid = "AC..."
/// auth_token = "..."
/// from = "+15550000"
/// ```
///
/// Only the block of the active provider is ever read. Blocks for other
/// providers may stay in the file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Name of the active provider; unset leaves the channel inactive
    #[serde(default, alias = "active_provider", skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Settings per provider name
    #[serde(default)]
    pub providers: HashMap<String, HashMap<String, String>>,
}

impl ChannelSettings {
    /// The configured provider name, trimmed; blank counts as unset
    pub fn active_provider(&self) -> Option<&str> {
        self.provider
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Settings block of the provider `name`, matched ignoring ASCII case.
    ///
    /// Returns an empty map when no block exists.
    pub fn provider_values(&self, name: &str) -> HashMap<String, String> {
        self.providers
            .get(name)
            .or_else(|| {
                self.providers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, values)| values)
            })
            .cloned()
            .unwrap_or_default()
    }

    /// Settings block of the active provider; empty when none is active
    pub fn active_provider_settings(&self) -> HashMap<String, String> {
        self.active_provider()
            .map(|name| self.provider_values(name))
            .unwrap_or_default()
    }
}

/// Per-channel provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub email: ChannelSettings,

    #[serde(default)]
    pub sms: ChannelSettings,

    #[serde(default)]
    pub push: ChannelSettings,

    #[serde(default)]
    pub whatsapp: ChannelSettings,

    #[serde(default)]
    pub telegram: ChannelSettings,
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound HTTP client configuration
    #[serde(default)]
    pub http: HttpClientConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Notification channels
    #[serde(default)]
    pub channels: ChannelsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Arbitrary implementations for property-based testing
    // ========================================================================

    fn arb_application_config() -> impl Strategy<Value = ApplicationConfig> {
        ("[a-z][a-z0-9-]{0,20}", "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}")
            .prop_map(|(name, version)| ApplicationConfig { name, version })
    }

    fn arb_server_config() -> impl Strategy<Value = ServerConfig> {
        (
            prop_oneof![
                Just("127.0.0.1".to_string()),
                Just("0.0.0.0".to_string()),
                Just("localhost".to_string()),
            ],
            1u16..=65535u16,
            1u64..=300u64,
            1u64..=300u64,
        )
            .prop_map(
                |(host, port, request_timeout, keep_alive_timeout)| ServerConfig {
                    host,
                    port,
                    request_timeout,
                    keep_alive_timeout,
                },
            )
    }

    fn arb_http_config() -> impl Strategy<Value = HttpClientConfig> {
        (
            1u64..=120u64,
            1u64..=60u64,
            0usize..=64usize,
            proptest::option::of("[a-z]{3,10}/[0-9]\\.[0-9]"),
        )
            .prop_map(
                |(timeout, connect_timeout, pool_max_idle_per_host, user_agent)| {
                    HttpClientConfig {
                        timeout,
                        connect_timeout,
                        pool_max_idle_per_host,
                        user_agent,
                    }
                },
            )
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof![
                Just("trace".to_string()),
                Just("debug".to_string()),
                Just("info".to_string()),
                Just("warn".to_string()),
                Just("error".to_string()),
            ],
            (any::<bool>(), any::<bool>()),
            (
                any::<bool>(),
                prop_oneof![
                    Just("logs/notifier.log".to_string()),
                    Just("/var/log/notifier.log".to_string()),
                ],
                any::<bool>(),
                prop_oneof![
                    Just("json".to_string()),
                    Just("full".to_string()),
                    Just("compact".to_string()),
                ],
            ),
        )
            .prop_map(
                |(level, (enabled, colored), (file_enabled, path, append, format))| {
                    LoggerSettings {
                        level,
                        console: ConsoleSettings { enabled, colored },
                        file: FileSettings {
                            enabled: file_enabled,
                            path,
                            append,
                            format,
                        },
                    }
                },
            )
    }

    fn arb_channel_settings() -> impl Strategy<Value = ChannelSettings> {
        (
            proptest::option::of(prop_oneof![
                Just("sendgrid".to_string()),
                Just("twilio".to_string()),
                Just("bot".to_string()),
            ]),
            proptest::collection::hash_map(
                "[a-z]{3,8}",
                proptest::collection::hash_map("[a-z_]{3,12}", "[A-Za-z0-9:+@.]{1,20}", 0..4),
                0..3,
            ),
        )
            .prop_map(|(provider, providers)| ChannelSettings {
                provider,
                providers,
            })
    }

    fn arb_channels_config() -> impl Strategy<Value = ChannelsConfig> {
        (
            arb_channel_settings(),
            arb_channel_settings(),
            arb_channel_settings(),
            arb_channel_settings(),
            arb_channel_settings(),
        )
            .prop_map(|(email, sms, push, whatsapp, telegram)| ChannelsConfig {
                email,
                sms,
                push,
                whatsapp,
                telegram,
            })
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_application_config(),
            arb_server_config(),
            arb_http_config(),
            arb_logger_settings(),
            arb_channels_config(),
        )
            .prop_map(|(application, server, http, logger, channels)| Settings {
                application,
                server,
                http,
                logger,
                channels,
            })
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing any Settings to TOML and back yields the same Settings
        #[test]
        fn prop_settings_round_trip_serialization(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings)
                .expect("Settings should serialize to TOML");

            let deserialized: Settings = toml::from_str(&toml_str)
                .expect("TOML should deserialize back to Settings");

            prop_assert_eq!(settings, deserialized);
        }
    }

    // ========================================================================
    // Unit tests
    // ========================================================================

    #[test]
    fn test_application_config_defaults() {
        let config = ApplicationConfig::default();
        assert_eq!(config.name, "notifier-rs");
        assert_eq!(config.version, crate::pkg_version());
    }

    #[test]
    fn test_server_config_address() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.application.name, "notifier-rs");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.logger.level, "info");
        assert!(settings.channels.email.active_provider().is_none());
    }

    #[test]
    fn test_settings_deserialize_channels() {
        let toml_str = r#"
            [channels.email]
            provider = "sendgrid"

            [channels.email.providers.sendgrid]
            api_key = "SG.key"
            from = "noreply@example.com"

            [channels.email.providers.mailgun]
            api_key = "unused"

            [channels.sms]
            active_provider = "twilio"
        "#;

        let settings: Settings = toml::from_str(toml_str).expect("Failed to deserialize");

        assert_eq!(settings.channels.email.active_provider(), Some("sendgrid"));
        let active = settings.channels.email.active_provider_settings();
        assert_eq!(active.get("api_key").map(String::as_str), Some("SG.key"));
        assert_eq!(active.len(), 2);
        assert_eq!(settings.channels.sms.active_provider(), Some("twilio"));
        assert!(settings.channels.push.active_provider().is_none());
    }

    #[test]
    fn test_active_provider_settings_empty_without_name() {
        let mut channel = ChannelSettings::default();
        channel.providers.insert(
            "twilio".to_string(),
            HashMap::from([("from".to_string(), "+1".to_string())]),
        );
        assert!(channel.active_provider_settings().is_empty());

        channel.provider = Some("   ".to_string());
        assert!(channel.active_provider_settings().is_empty());
    }

    #[test]
    fn test_provider_values_ignore_case() {
        let mut channel = ChannelSettings {
            provider: Some("SendGrid".to_string()),
            ..Default::default()
        };
        channel.providers.insert(
            "sendgrid".to_string(),
            HashMap::from([("from".to_string(), "a@b.c".to_string())]),
        );

        let values = channel.active_provider_settings();
        assert_eq!(values.get("from").map(String::as_str), Some("a@b.c"));
    }

    #[test]
    fn test_file_settings_into_file_config_all_formats() {
        for (format_str, expected) in [
            ("full", LogFormat::Full),
            ("compact", LogFormat::Compact),
            ("json", LogFormat::Json),
            ("FULL", LogFormat::Full),
        ] {
            let settings = FileSettings {
                format: format_str.to_string(),
                ..Default::default()
            };
            let config = settings.into_file_config().expect("Should convert");
            assert_eq!(config.format, expected, "Format {} should convert", format_str);
        }
    }

    #[test]
    fn test_file_settings_into_file_config_invalid_format() {
        let settings = FileSettings {
            format: "invalid".to_string(),
            ..Default::default()
        };
        match settings.into_file_config() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "logger.file.format")
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            ..Default::default()
        };
        let config = settings.into_logger_config().expect("Should convert");
        assert_eq!(config.level, "debug");
        assert!(config.console.enabled);
        assert!(!config.file.enabled);
    }

    #[test]
    fn test_logger_settings_both_disabled() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        assert!(settings.into_logger_config().is_err());
    }
}
