//! Notification-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};

use crate::notifications::NotificationRequest;

/// Generic notification for any configured channel.
///
/// Every field is optional on the wire; missing parts are reported by the
/// dispatcher as a validation error naming the field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "type": "TELEGRAM",
    "to": "123456789",
    "subject": "Deploy finished",
    "message": "Version 1.4.2 is live",
    "additionalData": { "disable_notification": true }
}))]
pub struct SendNotificationRequest {
    /// Channel type: EMAIL, SMS, PUSH, WHATSAPP or TELEGRAM (any case)
    #[serde(rename = "type", default)]
    pub notification_type: Option<String>,
    /// Destination: email address, phone number, device token or chat id
    #[serde(default)]
    pub to: Option<String>,
    /// Email subject, push title or chat heading
    #[serde(default)]
    pub subject: Option<String>,
    /// Message body
    #[serde(default)]
    pub message: Option<String>,
    /// Provider-specific extras
    #[serde(default, alias = "additional_data")]
    #[schema(value_type = Option<Object>)]
    pub additional_data: Option<JsonValue>,
}

impl From<SendNotificationRequest> for NotificationRequest {
    fn from(dto: SendNotificationRequest) -> Self {
        NotificationRequest::from_parts(
            dto.notification_type,
            dto.to,
            dto.subject,
            dto.message,
            dto.additional_data,
        )
    }
}

/// Query parameters of `POST /api/notifications/email`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Recipient email address
    pub to: Option<String>,
    /// Email subject
    pub subject: Option<String>,
    /// Plain text body
    pub message: Option<String>,
}

/// Query parameters of `POST /api/notifications/sms`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SmsQuery {
    /// Recipient phone number (E.164)
    pub to: Option<String>,
    pub message: Option<String>,
}

/// Query parameters of `POST /api/notifications/push`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PushQuery {
    /// Device registration token
    pub token: Option<String>,
    /// Notification title
    pub title: Option<String>,
    /// Notification body
    pub message: Option<String>,
}

/// Acknowledgement returned once the provider accepted the notification
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "sent",
    "notification_type": "SMS",
    "message": "SMS sent to +15550100"
}))]
pub struct SendNotificationResponse {
    #[schema(example = "sent")]
    pub status: String,
    pub notification_type: String,
    pub message: String,
}

impl SendNotificationResponse {
    pub fn sent(notification_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "sent".to_string(),
            notification_type: notification_type.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_both_data_spellings() {
        for body in [
            r#"{"type":"SMS","to":"+1","message":"hi","additionalData":{"k":1}}"#,
            r#"{"type":"SMS","to":"+1","message":"hi","additional_data":{"k":1}}"#,
        ] {
            let dto: SendNotificationRequest = serde_json::from_str(body).unwrap();
            let request = NotificationRequest::from(dto);
            assert_eq!(request.notification_type(), Some("SMS"));
            assert_eq!(request.additional_data().unwrap()["k"], 1);
        }
    }

    #[test]
    fn test_empty_object_keeps_missing_parts() {
        let dto: SendNotificationRequest = serde_json::from_str("{}").unwrap();
        let request = NotificationRequest::from(dto);
        assert!(request.notification_type().is_none());
        assert!(request.to().is_none());
        assert!(request.message().is_none());
    }
}
