//! Provider activation policy.
//!
//! Decides from configuration which concrete provider backs each channel and
//! builds the registry from the providers that are switched on. A channel
//! with no provider name configured stays inactive; a provider that is named
//! but misconfigured stops startup with a `Configuration` error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::settings::{ChannelSettings, ChannelsConfig};

use super::error::NotificationError;
use super::init_guard::InitGuard;
use super::provider::NotificationProvider;
use super::providers::{
    FirebaseApp, FirebaseProvider, SendGridProvider, TelegramProvider, TwilioSmsProvider,
    TwilioWhatsAppProvider,
};
use super::registry::ProviderRegistry;

/// Delivery channels known to the activation policy, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
    Push,
    WhatsApp,
    Telegram,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Email,
        Channel::Sms,
        Channel::Push,
        Channel::WhatsApp,
        Channel::Telegram,
    ];

    /// Section name under `channels` in configuration
    pub fn config_name(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
            Channel::WhatsApp => "whatsapp",
            Channel::Telegram => "telegram",
        }
    }

    /// Type tag served by this channel's providers
    pub fn type_tag(self) -> &'static str {
        match self {
            Channel::Email => "EMAIL",
            Channel::Sms => "SMS",
            Channel::Push => "PUSH",
            Channel::WhatsApp => "WHATSAPP",
            Channel::Telegram => "TELEGRAM",
        }
    }

    /// Provider names accepted in `channels.<channel>.provider`
    pub fn supported_providers(self) -> &'static [&'static str] {
        match self {
            Channel::Email => &[SendGridProvider::NAME],
            Channel::Sms | Channel::WhatsApp => &["twilio"],
            Channel::Push => &["firebase"],
            Channel::Telegram => &["bot"],
        }
    }

    /// This channel's section of `channels`
    pub fn settings(self, channels: &ChannelsConfig) -> &ChannelSettings {
        match self {
            Channel::Email => &channels.email,
            Channel::Sms => &channels.sms,
            Channel::Push => &channels.push,
            Channel::WhatsApp => &channels.whatsapp,
            Channel::Telegram => &channels.telegram,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Whether `provider_name` is the one configured as active for a channel.
///
/// Comparison ignores ASCII case; an unset or blank name activates nothing.
pub fn should_activate(settings: &ChannelSettings, provider_name: &str) -> bool {
    settings
        .active_provider()
        .is_some_and(|active| active.eq_ignore_ascii_case(provider_name))
}

/// Key/value settings of the provider selected for one channel
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    channel: Channel,
    provider: String,
    values: HashMap<String, String>,
}

impl ProviderSettings {
    pub fn new(
        channel: Channel,
        provider: impl Into<String>,
        values: HashMap<String, String>,
    ) -> Self {
        Self {
            channel,
            provider: provider.into(),
            values,
        }
    }

    /// Builds settings from literal pairs
    pub fn from_pairs<K, V>(
        channel: Channel,
        provider: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(channel, provider, values)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Fully qualified configuration key for `key`
    pub fn key_path(&self, key: &str) -> String {
        format!(
            "channels.{}.providers.{}.{}",
            self.channel, self.provider, key
        )
    }

    /// A setting that must be present and non-blank
    pub fn require(&self, key: &str) -> Result<&str, NotificationError> {
        self.optional(key).ok_or_else(|| {
            NotificationError::configuration(
                self.key_path(key),
                format!(
                    "required setting is missing for the {} provider of the {} channel",
                    self.provider, self.channel
                ),
            )
        })
    }

    /// A setting that may be absent; blank values count as absent
    pub fn optional(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

// Values are secrets more often than not
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("ProviderSettings")
            .field("channel", &self.channel)
            .field("provider", &self.provider)
            .field("keys", &keys)
            .finish()
    }
}

/// Shared resources handed to provider constructors
#[derive(Clone, Debug)]
pub struct ProviderContext {
    http: reqwest::Client,
    firebase: Arc<InitGuard<Arc<FirebaseApp>>>,
}

impl ProviderContext {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            firebase: Arc::new(InitGuard::new()),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Process-wide Firebase initialization shared by every push provider
    pub fn firebase(&self) -> &Arc<InitGuard<Arc<FirebaseApp>>> {
        &self.firebase
    }
}

/// Builds the registry from channel configuration.
///
/// Channels are visited in the fixed order email, sms, push, whatsapp,
/// telegram, so registration order never depends on map iteration.
///
/// # Errors
/// `Configuration` if a channel names an unknown provider or the named
/// provider is missing a required setting or fails to initialize.
pub fn build_registry(
    channels: &ChannelsConfig,
    context: &ProviderContext,
) -> Result<ProviderRegistry, NotificationError> {
    let mut builder = ProviderRegistry::builder();

    for channel in Channel::ALL {
        let channel_settings = channel.settings(channels);
        let Some(configured) = channel_settings.active_provider() else {
            tracing::debug!(channel = %channel, "No provider configured, channel inactive");
            continue;
        };

        let Some(&name) = channel
            .supported_providers()
            .iter()
            .find(|candidate| should_activate(channel_settings, candidate))
        else {
            return Err(unknown_provider(channel, configured));
        };

        let settings = ProviderSettings::new(channel, name, channel_settings.provider_values(name));
        let provider = instantiate(&settings, context)?;

        tracing::info!(
            channel = %channel,
            provider = %provider.name(),
            "Provider activated"
        );
        builder = builder.register(provider);
    }

    let registry = builder.build();
    if registry.is_empty() {
        tracing::warn!("No notification providers are active; every send will be unsupported");
    }
    Ok(registry)
}

fn instantiate(
    settings: &ProviderSettings,
    context: &ProviderContext,
) -> Result<Arc<dyn NotificationProvider>, NotificationError> {
    let http = context.http().clone();

    let provider: Arc<dyn NotificationProvider> = match (settings.channel(), settings.provider())
    {
        (Channel::Email, "sendgrid") => Arc::new(SendGridProvider::new(settings, http)?),
        (Channel::Sms, "twilio") => Arc::new(TwilioSmsProvider::new(settings, http)?),
        (Channel::Push, "firebase") => Arc::new(FirebaseProvider::new(
            settings,
            http,
            context.firebase(),
        )?),
        (Channel::WhatsApp, "twilio") => Arc::new(TwilioWhatsAppProvider::new(settings, http)?),
        (Channel::Telegram, "bot") => Arc::new(TelegramProvider::new(settings, http)?),
        (channel, other) => return Err(unknown_provider(channel, other)),
    };

    Ok(provider)
}

fn unknown_provider(channel: Channel, name: &str) -> NotificationError {
    NotificationError::configuration(
        format!("channels.{}.provider", channel),
        format!(
            "unknown provider '{}', supported: {}",
            name,
            channel.supported_providers().join(", ")
        ),
    )
}
