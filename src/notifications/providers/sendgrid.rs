//! SendGrid email provider.
//!
//! Sends plain-text email through the SendGrid v3 Mail Send API.
//!
//! API Reference: https://www.twilio.com/docs/sendgrid/api-reference/mail-send/mail-send

use std::fmt;

use async_trait::async_trait;
use serde_json::json;

use super::{base_url, ensure_success};
use crate::notifications::activation::ProviderSettings;
use crate::notifications::error::{NotificationError, ProviderResult};
use crate::notifications::provider::NotificationProvider;
use crate::notifications::request::NotificationRequest;

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

/// Email provider backed by SendGrid
///
/// # Settings
/// - `api_key` (required): SendGrid API key
/// - `from` (required): sender address
/// - `from_name`: sender display name
/// - `base_url`: API root, defaults to `https://api.sendgrid.com`
pub struct SendGridProvider {
    http: reqwest::Client,
    api_key: String,
    from: String,
    from_name: Option<String>,
    base_url: String,
}

impl SendGridProvider {
    pub const NAME: &'static str = "sendgrid";

    /// Creates the provider from its channel settings
    ///
    /// # Errors
    /// `Configuration` if `api_key` or `from` is missing.
    pub fn new(settings: &ProviderSettings, http: reqwest::Client) -> Result<Self, NotificationError> {
        let api_key = settings.require("api_key")?.to_string();
        let from = settings.require("from")?.to_string();
        let from_name = settings.optional("from_name").map(str::to_string);
        let base_url = base_url(settings, DEFAULT_BASE_URL);

        tracing::info!(from = %from, "SendGrid provider initialized");

        Ok(Self {
            http,
            api_key,
            from,
            from_name,
            base_url,
        })
    }

    /// Builds the Mail Send request body
    ///
    /// A missing subject is sent as an empty string; the body is always
    /// `text/plain`.
    fn build_request_body(&self, request: &NotificationRequest) -> serde_json::Value {
        let mut from = json!({ "email": self.from });
        if let Some(name) = &self.from_name {
            from["name"] = json!(name);
        }

        json!({
            "personalizations": [
                { "to": [ { "email": request.to().unwrap_or_default() } ] }
            ],
            "from": from,
            "subject": request.subject().unwrap_or_default(),
            "content": [
                { "type": "text/plain", "value": request.message().unwrap_or_default() }
            ],
        })
    }
}

impl fmt::Debug for SendGridProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendGridProvider")
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationProvider for SendGridProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn notification_type(&self) -> &str {
        "EMAIL"
    }

    async fn send(&self, request: &NotificationRequest) -> ProviderResult<()> {
        let url = format!("{}/v3/mail/send", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request_body(request))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        tracing::debug!(
            status = response.status().as_u16(),
            message_id = response
                .headers()
                .get("x-message-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-"),
            "SendGrid accepted email"
        );
        Ok(())
    }
}
