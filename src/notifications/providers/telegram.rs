//! Telegram Bot API provider.
//!
//! Sends chat messages with `sendMessage`. The destination is the chat ID
//! (or `@channelusername`) of the recipient.
//!
//! API Reference: https://core.telegram.org/bots/api#sendmessage

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{base_url, ensure_success};
use crate::notifications::activation::ProviderSettings;
use crate::notifications::error::{NotificationError, ProviderError, ProviderResult};
use crate::notifications::provider::NotificationProvider;
use crate::notifications::request::NotificationRequest;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Keys owned by the provider; `additional_data` cannot override them
const RESERVED_KEYS: [&str; 3] = ["chat_id", "text", "parse_mode"];

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Chat provider backed by a Telegram bot
///
/// # Settings
/// - `bot_token` (required): token issued by BotFather
/// - `bot_username` (required): the bot's username, used in logs
/// - `base_url`: API root, defaults to `https://api.telegram.org`
pub struct TelegramProvider {
    http: reqwest::Client,
    bot_token: String,
    bot_username: String,
    base_url: String,
}

impl TelegramProvider {
    pub fn new(settings: &ProviderSettings, http: reqwest::Client) -> Result<Self, NotificationError> {
        let bot_token = settings.require("bot_token")?.to_string();
        let bot_username = settings.require("bot_username")?.to_string();

        tracing::info!(bot = %bot_username, "Telegram bot provider initialized");

        Ok(Self {
            http,
            bot_token,
            bot_username,
            base_url: base_url(settings, DEFAULT_BASE_URL),
        })
    }

    /// Builds the `sendMessage` parameters
    ///
    /// A non-empty subject is prepended in bold and switches the message to
    /// Markdown. Entries of an `additional_data` object are passed through as
    /// extra parameters (`disable_notification`, `reply_markup`, ...).
    fn build_payload(&self, request: &NotificationRequest) -> Value {
        let message = request.message().unwrap_or_default();
        let mut payload = json!({ "chat_id": request.to().unwrap_or_default() });

        match request.non_empty_subject() {
            Some(subject) => {
                payload["text"] = json!(format!("*{}*\n\n{}", subject, message));
                payload["parse_mode"] = json!("Markdown");
            }
            None => payload["text"] = json!(message),
        }

        if let Some(Value::Object(extra)) = request.additional_data() {
            for (key, value) in extra {
                if RESERVED_KEYS.contains(&key.as_str()) {
                    tracing::debug!(key = %key, "Ignoring reserved Telegram parameter");
                    continue;
                }
                payload[key.as_str()] = value.clone();
            }
        }

        payload
    }
}

impl fmt::Debug for TelegramProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramProvider")
            .field("bot_username", &self.bot_username)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationProvider for TelegramProvider {
    fn name(&self) -> &'static str {
        "telegram-bot"
    }

    fn notification_type(&self) -> &str {
        "TELEGRAM"
    }

    async fn send(&self, request: &NotificationRequest) -> ProviderResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);

        let response = self
            .http
            .post(&url)
            .json(&self.build_payload(request))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let reply: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::undecodable("response body", e))?;
        if !reply.ok {
            return Err(ProviderError::rejected(
                reply
                    .description
                    .unwrap_or_else(|| "Telegram returned ok=false".to_string()),
            ));
        }

        tracing::debug!(bot = %self.bot_username, "Telegram accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::activation::Channel;
    use mockito::Matcher;

    fn settings(base_url: &str) -> ProviderSettings {
        ProviderSettings::from_pairs(
            Channel::Telegram,
            "bot",
            [
                ("bot_token", "123:abc"),
                ("bot_username", "notifier_bot"),
                ("base_url", base_url),
            ],
        )
    }

    fn provider(base_url: &str) -> TelegramProvider {
        TelegramProvider::new(&settings(base_url), reqwest::Client::new()).unwrap()
    }

    #[test]
    fn test_payload_with_subject_uses_markdown() {
        let request = NotificationRequest::new("TELEGRAM", "42", "Body").with_subject("Alert");
        let payload = provider("http://localhost").build_payload(&request);

        assert_eq!(payload["chat_id"], "42");
        assert_eq!(payload["text"], "*Alert*\n\nBody");
        assert_eq!(payload["parse_mode"], "Markdown");
    }

    #[test]
    fn test_payload_without_subject_is_plain() {
        let request = NotificationRequest::new("TELEGRAM", "42", "Body").with_subject("");
        let payload = provider("http://localhost").build_payload(&request);

        assert_eq!(payload["text"], "Body");
        assert!(payload.get("parse_mode").is_none());
    }

    #[test]
    fn test_additional_data_cannot_override_core_keys() {
        let request = NotificationRequest::new("TELEGRAM", "42", "Body")
            .with_additional_data(json!({ "chat_id": "999", "disable_notification": true }));
        let payload = provider("http://localhost").build_payload(&request);

        assert_eq!(payload["chat_id"], "42");
        assert_eq!(payload["disable_notification"], true);
    }

    #[test]
    fn test_requires_bot_username() {
        let settings =
            ProviderSettings::from_pairs(Channel::Telegram, "bot", [("bot_token", "123:abc")]);
        let err = TelegramProvider::new(&settings, reqwest::Client::new()).unwrap_err();
        assert!(
            err.to_string()
                .contains("channels.telegram.providers.bot.bot_username")
        );
    }

    #[test]
    fn test_debug_hides_token() {
        assert!(!format!("{:?}", provider("http://localhost")).contains("123:abc"));
    }

    #[tokio::test]
    async fn test_send_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::PartialJson(json!({ "chat_id": "42", "text": "hi" })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"message_id":7}}"#)
            .create_async()
            .await;

        let request = NotificationRequest::new("TELEGRAM", "42", "hi");
        provider(&server.url()).send(&request).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ok_false_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let request = NotificationRequest::new("TELEGRAM", "42", "hi");
        let err = provider(&server.url()).send(&request).await.unwrap_err();
        match err {
            ProviderError::Rejected { message } => assert!(message.contains("chat not found")),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_keeps_description() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(403)
            .with_body(r#"{"ok":false,"description":"Forbidden: bot was blocked by the user"}"#)
            .create_async()
            .await;

        let request = NotificationRequest::new("TELEGRAM", "42", "hi");
        let err = provider(&server.url()).send(&request).await.unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("blocked"));
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_token() {
        let settings = ProviderSettings::from_pairs(
            Channel::Telegram,
            "bot",
            [
                ("bot_token", "123:TOPSECRET"),
                ("bot_username", "notifier_bot"),
                ("base_url", "http://127.0.0.1:9"),
            ],
        );
        let provider = TelegramProvider::new(&settings, reqwest::Client::new()).unwrap();

        let err = provider
            .send(&NotificationRequest::new("TELEGRAM", "42", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Http(_)));
        assert!(!err.to_string().contains("TOPSECRET"));
        assert!(!format!("{:?}", err).contains("TOPSECRET"));
    }

    #[tokio::test]
    async fn test_undecodable_reply_does_not_expose_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let request = NotificationRequest::new("TELEGRAM", "42", "hi");
        let err = provider(&server.url()).send(&request).await.unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
        assert!(!err.to_string().contains("123:abc"));
    }
}
