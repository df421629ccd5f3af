//! Notification error types
//!
//! `NotificationError` is the only error kind that leaves the dispatcher.
//! `ProviderError` is what a provider reports for a failed transmission; the
//! dispatcher wraps it into `NotificationError::DeliveryFailed`.

use thiserror::Error;

/// Errors surfaced by the notification core
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The request is absent or incomplete; fix the input and resend
    #[error("Invalid notification request: {reason}")]
    InvalidRequest {
        /// The offending field ("request", "type", "to", "message")
        field: String,
        reason: String,
    },

    /// No registered provider handles the requested type
    #[error("No provider available for notification type: {notification_type}")]
    UnsupportedChannel { notification_type: String },

    /// A provider could not be brought online
    #[error("Configuration error for '{key}': {message}")]
    Configuration {
        /// Fully qualified setting key, e.g. `channels.sms.providers.twilio.from`
        key: String,
        message: String,
    },

    /// A provider was invoked and the transmission failed
    #[error("Failed to deliver {notification_type} notification via {provider}")]
    DeliveryFailed {
        notification_type: String,
        provider: String,
        #[source]
        source: ProviderError,
    },
}

impl NotificationError {
    pub fn invalid_request(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_channel(notification_type: impl Into<String>) -> Self {
        Self::UnsupportedChannel {
            notification_type: notification_type.into(),
        }
    }

    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::UnsupportedChannel { .. } => "UNSUPPORTED_CHANNEL",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::DeliveryFailed { .. } => "DELIVERY_FAILED",
        }
    }
}

/// Failure reported by a provider's `send`
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, TLS, timeout, body decoding).
    ///
    /// Holds the error without its URL: some APIs carry credentials in the
    /// path (Telegram's `/bot<token>/`), and this text reaches API callers.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// The remote API answered with a non-success status
    #[error("Provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The remote API answered successfully but refused the message
    #[error("Provider rejected the message: {message}")]
    Rejected { message: String },

    /// The response could not be understood
    #[error("Invalid provider response: {message}")]
    InvalidResponse { message: String },

    /// Credentials could not be turned into an access token
    #[error("Provider authentication failed: {message}")]
    Auth { message: String },

    /// Any other provider-specific failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.without_url())
    }
}

impl ProviderError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// A response body that could not be decoded, URL stripped
    pub fn undecodable(context: &str, error: reqwest::Error) -> Self {
        Self::invalid_response(format!("{}: {}", context, error.without_url()))
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }
}

/// Result alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_delivery_failed_keeps_source() {
        let err = NotificationError::DeliveryFailed {
            notification_type: "SMS".to_string(),
            provider: "twilio-sms".to_string(),
            source: ProviderError::status(401, "unauthorized"),
        };

        assert_eq!(
            err.to_string(),
            "Failed to deliver SMS notification via twilio-sms"
        );
        let source = err.source().expect("source should be preserved");
        assert!(source.to_string().contains("401"));
    }

    #[test]
    fn test_configuration_message_names_key() {
        let err = NotificationError::configuration(
            "channels.email.providers.sendgrid.api_key",
            "required setting is missing",
        );
        assert!(err.to_string().contains("api_key"));
        assert_eq!(err.kind(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_unsupported_channel_names_type() {
        let err = NotificationError::unsupported_channel("FAX");
        assert!(err.to_string().contains("FAX"));
        assert_eq!(err.kind(), "UNSUPPORTED_CHANNEL");
    }
}
