//! Notification request record.
//!
//! A `NotificationRequest` is the canonical, immutable description of one
//! send request. Construction never fails: a request missing its type,
//! destination or body is still a value, and is only rejected when it is
//! handed to the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::NotificationError;

/// One outbound notification.
///
/// Fields are private so a request cannot change after it has been built;
/// use the accessors to read it and the `with_*` methods to derive a new one.
///
/// # Example
/// ```ignore
/// let request = NotificationRequest::new("EMAIL", "a@b.com", "Hello")
///     .with_subject("Hi");
/// service.send(&request).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Channel discriminator ("EMAIL", "SMS", "PUSH", ...), matched case-insensitively
    #[serde(rename = "type", default)]
    notification_type: Option<String>,
    /// Destination: email address, phone number, device token or chat id
    #[serde(default)]
    to: Option<String>,
    /// Optional header: email subject, push title, chat bold prefix
    #[serde(default)]
    subject: Option<String>,
    /// Message body
    #[serde(default)]
    message: Option<String>,
    /// Opaque provider-specific payload
    #[serde(default, alias = "additional_data", skip_serializing_if = "Option::is_none")]
    additional_data: Option<JsonValue>,
}

impl NotificationRequest {
    /// Creates a request with the three required parts set
    pub fn new(
        notification_type: impl Into<String>,
        to: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            notification_type: Some(notification_type.into()),
            to: Some(to.into()),
            subject: None,
            message: Some(message.into()),
            additional_data: None,
        }
    }

    /// Creates a request from optional parts, exactly as a caller supplied them.
    ///
    /// Used by inbound adapters that may receive incomplete input; the
    /// dispatcher reports what is missing.
    pub fn from_parts(
        notification_type: Option<String>,
        to: Option<String>,
        subject: Option<String>,
        message: Option<String>,
        additional_data: Option<JsonValue>,
    ) -> Self {
        Self {
            notification_type,
            to,
            subject,
            message,
            additional_data,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_additional_data(mut self, data: JsonValue) -> Self {
        self.additional_data = Some(data);
        self
    }

    pub fn notification_type(&self) -> Option<&str> {
        self.notification_type.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Subject, treating an empty string as absent
    pub fn non_empty_subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn additional_data(&self) -> Option<&JsonValue> {
        self.additional_data.as_ref()
    }

    /// Checks that type, destination and body are present and non-empty.
    ///
    /// Fields are checked in that order and the first missing one is reported.
    /// On success the validated parts are returned borrowed from `self`.
    pub fn validate(&self) -> Result<ValidatedRequest<'_>, NotificationError> {
        let notification_type = required(self.notification_type.as_deref(), "type")?;
        let to = required(self.to.as_deref(), "to")?;
        let message = required(self.message.as_deref(), "message")?;

        Ok(ValidatedRequest {
            notification_type,
            to,
            message,
        })
    }
}

/// Required parts of a request that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest<'a> {
    pub notification_type: &'a str,
    pub to: &'a str,
    pub message: &'a str,
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, NotificationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(NotificationError::invalid_request(
            field,
            format!("'{}' must not be empty", field),
        )),
        None => Err(NotificationError::invalid_request(
            field,
            format!("'{}' is required", field),
        )),
    }
}
