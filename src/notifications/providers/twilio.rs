//! Twilio SMS and WhatsApp providers.
//!
//! Both channels go through the Programmable Messaging `Messages` resource;
//! WhatsApp only differs in the `whatsapp:` address scheme.
//!
//! API Reference: https://www.twilio.com/docs/messaging/api/message-resource

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use super::{base_url, ensure_success};
use crate::notifications::activation::ProviderSettings;
use crate::notifications::error::{NotificationError, ProviderError, ProviderResult};
use crate::notifications::provider::NotificationProvider;
use crate::notifications::request::NotificationRequest;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";
const WHATSAPP_SCHEME: &str = "whatsapp:";

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
    status: Option<String>,
}

/// Account credentials and sender shared by the Twilio channels
#[derive(Clone)]
struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from: String,
    base_url: String,
}

impl TwilioClient {
    fn from_settings(
        settings: &ProviderSettings,
        http: reqwest::Client,
    ) -> Result<Self, NotificationError> {
        Ok(Self {
            http,
            account_sid: settings.require("account_sid")?.to_string(),
            auth_token: settings.require("auth_token")?.to_string(),
            from: settings.require("from")?.to_string(),
            base_url: base_url(settings, DEFAULT_BASE_URL),
        })
    }

    /// Creates one message and returns its SID
    async fn create_message(&self, to: &str, from: &str, body: &str) -> ProviderResult<String> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::undecodable("response body", e))?;
        let sid = message
            .sid
            .ok_or_else(|| ProviderError::invalid_response("message resource has no sid"))?;

        tracing::debug!(
            sid = %sid,
            status = message.status.as_deref().unwrap_or("unknown"),
            "Twilio accepted message"
        );
        Ok(sid)
    }
}

impl fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioClient")
            .field("account_sid", &self.account_sid)
            .field("from", &self.from)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// SMS provider backed by Twilio
///
/// # Settings
/// - `account_sid`, `auth_token` (required): account credentials
/// - `from` (required): sending phone number
/// - `base_url`: API root, defaults to `https://api.twilio.com`
#[derive(Debug)]
pub struct TwilioSmsProvider {
    client: TwilioClient,
}

impl TwilioSmsProvider {
    pub fn new(settings: &ProviderSettings, http: reqwest::Client) -> Result<Self, NotificationError> {
        let client = TwilioClient::from_settings(settings, http)?;
        tracing::info!(from = %client.from, "Twilio SMS provider initialized");
        Ok(Self { client })
    }
}

#[async_trait]
impl NotificationProvider for TwilioSmsProvider {
    fn name(&self) -> &'static str {
        "twilio-sms"
    }

    fn notification_type(&self) -> &str {
        "SMS"
    }

    async fn send(&self, request: &NotificationRequest) -> ProviderResult<()> {
        self.client
            .create_message(
                request.to().unwrap_or_default(),
                &self.client.from,
                request.message().unwrap_or_default(),
            )
            .await?;
        Ok(())
    }
}

/// WhatsApp provider backed by Twilio
///
/// Takes the same settings as [`TwilioSmsProvider`]. Both addresses are sent
/// with the `whatsapp:` prefix; an address that already carries it is left
/// unchanged.
#[derive(Debug)]
pub struct TwilioWhatsAppProvider {
    client: TwilioClient,
}

impl TwilioWhatsAppProvider {
    pub fn new(settings: &ProviderSettings, http: reqwest::Client) -> Result<Self, NotificationError> {
        let client = TwilioClient::from_settings(settings, http)?;
        tracing::info!(from = %client.from, "Twilio WhatsApp provider initialized");
        Ok(Self { client })
    }
}

fn whatsapp_address(address: &str) -> String {
    if address.starts_with(WHATSAPP_SCHEME) {
        address.to_string()
    } else {
        format!("{}{}", WHATSAPP_SCHEME, address)
    }
}

#[async_trait]
impl NotificationProvider for TwilioWhatsAppProvider {
    fn name(&self) -> &'static str {
        "twilio-whatsapp"
    }

    fn notification_type(&self) -> &str {
        "WHATSAPP"
    }

    async fn send(&self, request: &NotificationRequest) -> ProviderResult<()> {
        let to = whatsapp_address(request.to().unwrap_or_default());
        let from = whatsapp_address(&self.client.from);

        self.client
            .create_message(&to, &from, request.message().unwrap_or_default())
            .await?;
        Ok(())
    }
}
