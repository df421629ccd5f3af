//! Core notification provider trait.
//!
//! This module provides the capability contract every delivery backend
//! implements, allowing the dispatcher to treat heterogeneous channels
//! uniformly.

use async_trait::async_trait;

use super::error::ProviderResult;
use super::request::NotificationRequest;

/// Trait for notification providers (email, SMS, push, chat, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// All providers must be Send + Sync so one instance can serve concurrent
/// dispatches.
///
/// # Example Implementation
/// ```ignore
/// use async_trait::async_trait;
///
/// pub struct SmsProvider {
///     from: String,
/// }
///
/// #[async_trait]
/// impl NotificationProvider for SmsProvider {
///     fn name(&self) -> &'static str {
///         "sms-gateway"
///     }
///
///     fn notification_type(&self) -> &str {
///         "SMS"
///     }
///
///     async fn send(&self, request: &NotificationRequest) -> ProviderResult<()> {
///         // Implementation here
///     }
/// }
/// ```
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Returns the provider name for logging/debugging (e.g. "sendgrid")
    fn name(&self) -> &'static str;

    /// The fixed type tag this instance serves (e.g. "EMAIL")
    fn notification_type(&self) -> &str;

    /// Whether this provider handles `notification_type`.
    ///
    /// The default is a case-insensitive exact match against
    /// [`NotificationProvider::notification_type`].
    fn supports(&self, notification_type: &str) -> bool {
        matches_type(self.notification_type(), notification_type)
    }

    /// Performs exactly one external transmission for `request`.
    ///
    /// The request has already been validated by the dispatcher, so `to` and
    /// `message` are present and non-empty.
    async fn send(&self, request: &NotificationRequest) -> ProviderResult<()>;
}

/// Case-insensitive exact match of a type tag
pub fn matches_type(tag: &str, requested: &str) -> bool {
    tag.eq_ignore_ascii_case(requested)
}
