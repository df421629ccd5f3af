//! Send command handler
//!
//! Sends one notification through the same dispatcher the server uses.

use serde_json::Value as JsonValue;

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::notifications::{NotificationRequest, NotificationService};
use crate::server::build_notification_service;

/// Handler for the send command
pub struct SendCommandHandler {
    service: NotificationService,
}

impl SendCommandHandler {
    /// Wire the configured providers
    pub fn new(config: &Settings) -> AppResult<Self> {
        Ok(Self::with_service(build_notification_service(config)?))
    }

    /// Use an already wired dispatcher
    pub fn with_service(service: NotificationService) -> Self {
        Self { service }
    }

    /// Build the request from command arguments and dispatch it
    ///
    /// Returns the name of the provider that delivered the notification.
    pub async fn execute(
        &self,
        notification_type: &str,
        to: &str,
        subject: Option<&str>,
        message: &str,
        data: Option<JsonValue>,
    ) -> AppResult<&'static str> {
        let mut request = NotificationRequest::new(notification_type, to, message);
        if let Some(subject) = subject {
            request = request.with_subject(subject);
        }
        if let Some(data) = data {
            request = request.with_additional_data(data);
        }

        self.service.send(&request).await?;

        // send() succeeded, so a provider for this type exists
        let provider = self
            .service
            .registry()
            .resolve(notification_type)
            .map(|p| p.name())
            .unwrap_or("unknown");

        println!(
            "✓ {} notification sent to {} via {}",
            notification_type.to_ascii_uppercase(),
            to,
            provider
        );
        Ok(provider)
    }
}
