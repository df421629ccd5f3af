//! Notification dispatcher.
//!
//! Validates a request, resolves the provider serving its type and invokes
//! it once, translating every failure into a `NotificationError`.

use std::time::Instant;

use tracing::Instrument;

use super::error::NotificationError;
use super::registry::ProviderRegistry;
use super::request::NotificationRequest;

/// Routes notification requests to registered providers.
///
/// Stateless between calls and cheap to clone, so one instance can be shared
/// by every request handler. There are no retries, no timeouts and no
/// internal concurrency: one call invokes at most one provider, once.
#[derive(Clone, Debug)]
pub struct NotificationService {
    registry: ProviderRegistry,
}

impl NotificationService {
    /// Creates a dispatcher over an already wired registry
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher resolves against
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Sends a notification through the provider registered for its type.
    ///
    /// # Errors
    /// - `InvalidRequest` if type, destination or message is missing or empty
    /// - `UnsupportedChannel` if no provider handles the type
    /// - `DeliveryFailed` if the provider failed; the provider error is kept
    ///   as the source
    pub async fn send(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        self.dispatch(Some(request)).await
    }

    /// Same as [`send`](Self::send) for callers whose request may be absent.
    ///
    /// An absent request fails with `InvalidRequest` before anything else is
    /// looked at.
    pub async fn dispatch(
        &self,
        request: Option<&NotificationRequest>,
    ) -> Result<(), NotificationError> {
        let request = request.ok_or_else(|| {
            NotificationError::invalid_request("request", "notification request must not be null")
        })?;

        let valid = request.validate().inspect_err(|e| {
            tracing::debug!(error = %e, "Rejected notification request");
        })?;

        tracing::debug!(
            notification_type = %valid.notification_type,
            "Processing notification request"
        );

        let provider = self
            .registry
            .resolve(valid.notification_type)
            .ok_or_else(|| {
                tracing::warn!(
                    notification_type = %valid.notification_type,
                    "No provider registered for notification type"
                );
                NotificationError::unsupported_channel(valid.notification_type)
            })?;

        let span = tracing::info_span!(
            "notification_send",
            provider = %provider.name(),
            notification_type = %valid.notification_type,
        );

        async {
            let start = Instant::now();
            match provider.send(request).await {
                Ok(()) => {
                    tracing::info!(
                        duration_ms = %start.elapsed().as_millis(),
                        "Notification sent"
                    );
                    Ok(())
                }
                Err(source) => {
                    tracing::error!(
                        error = %source,
                        duration_ms = %start.elapsed().as_millis(),
                        "Notification delivery failed"
                    );
                    Err(NotificationError::DeliveryFailed {
                        notification_type: valid.notification_type.to_string(),
                        provider: provider.name().to_string(),
                        source,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::error::{ProviderError, ProviderResult};
    use crate::notifications::provider::NotificationProvider;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records every request it is asked to send
    struct RecordingProvider {
        name: &'static str,
        tag: &'static str,
        fail: bool,
        calls: AtomicUsize,
        sent: Mutex<Vec<NotificationRequest>>,
    }

    impl RecordingProvider {
        fn new(name: &'static str, tag: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                tag,
                fail: false,
                calls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn failing(name: &'static str, tag: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                tag,
                fail: true,
                calls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NotificationProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn notification_type(&self) -> &str {
            self.tag
        }

        async fn send(&self, request: &NotificationRequest) -> ProviderResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(request.clone());
            if self.fail {
                Err(ProviderError::status(503, "gateway unavailable"))
            } else {
                Ok(())
            }
        }
    }

    fn service_with(providers: &[Arc<RecordingProvider>]) -> NotificationService {
        let providers = providers
            .iter()
            .map(|p| p.clone() as Arc<dyn NotificationProvider>)
            .collect();
        NotificationService::new(ProviderRegistry::from_providers(providers))
    }

    fn standard_providers() -> Vec<Arc<RecordingProvider>> {
        vec![
            RecordingProvider::new("email", "EMAIL"),
            RecordingProvider::new("sms", "SMS"),
            RecordingProvider::new("push", "PUSH"),
        ]
    }

    #[tokio::test]
    async fn test_send_email_invokes_provider_once_with_same_request() {
        let email = RecordingProvider::new("email", "EMAIL");
        let service = service_with(std::slice::from_ref(&email));
        let request = NotificationRequest::new("EMAIL", "a@b.com", "Hello").with_subject("Hi");

        service.send(&request).await.unwrap();

        assert_eq!(email.calls(), 1);
        assert_eq!(email.sent.lock().unwrap()[0], request);
    }

    #[tokio::test]
    async fn test_send_unknown_type_is_unsupported() {
        let providers = standard_providers();
        let service = service_with(&providers);
        let request = NotificationRequest::new("FAX", "123", "x");

        let err = service.send(&request).await.unwrap_err();

        match err {
            NotificationError::UnsupportedChannel { notification_type } => {
                assert_eq!(notification_type, "FAX")
            }
            other => panic!("expected UnsupportedChannel, got {:?}", other),
        }
        assert!(providers.iter().all(|p| p.calls() == 0));
    }

    #[tokio::test]
    async fn test_send_empty_destination_is_invalid_before_lookup() {
        let providers = standard_providers();
        let service = service_with(&providers);
        let request = NotificationRequest::new("SMS", "", "x");

        let err = service.send(&request).await.unwrap_err();

        assert!(matches!(err, NotificationError::InvalidRequest { ref field, .. } if field == "to"));
        assert!(providers.iter().all(|p| p.calls() == 0));
    }

    #[tokio::test]
    async fn test_dispatch_absent_request_is_invalid() {
        let providers = standard_providers();
        let service = service_with(&providers);

        let err = service.dispatch(None).await.unwrap_err();

        assert!(
            matches!(err, NotificationError::InvalidRequest { ref field, .. } if field == "request")
        );
        assert!(providers.iter().all(|p| p.calls() == 0));
    }

    #[tokio::test]
    async fn test_invalid_type_checked_before_unsupported() {
        let service = service_with(&[]);
        let request = NotificationRequest::new("", "a@b.com", "Hello");

        let err = service.send(&request).await.unwrap_err();
        assert!(matches!(err, NotificationError::InvalidRequest { ref field, .. } if field == "type"));
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_delivery_failed_with_cause() {
        let sms = RecordingProvider::failing("sms", "SMS");
        let service = service_with(std::slice::from_ref(&sms));
        let request = NotificationRequest::new("sms", "+15550001", "code 1234");

        let err = service.send(&request).await.unwrap_err();

        assert_eq!(sms.calls(), 1);
        let source = err.source().expect("cause should be chained");
        assert!(source.to_string().contains("503"));
        match err {
            NotificationError::DeliveryFailed {
                notification_type,
                provider,
                source: ProviderError::Status { status, .. },
            } => {
                assert_eq!(notification_type, "sms");
                assert_eq!(provider, "sms");
                assert_eq!(status, 503);
            }
            other => panic!("expected DeliveryFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_registered_provider_receives_dispatch() {
        let first = RecordingProvider::new("first", "EMAIL");
        let second = RecordingProvider::new("second", "EMAIL");
        let service = service_with(&[first.clone(), second.clone()]);
        let request = NotificationRequest::new("EMAIL", "a@b.com", "Hello");

        for _ in 0..3 {
            service.send(&request).await.unwrap();
        }

        assert_eq!(first.calls(), 3);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_sends_are_independent() {
        let push = RecordingProvider::new("push", "PUSH");
        let service = service_with(std::slice::from_ref(&push));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    let request = NotificationRequest::new("PUSH", format!("token-{}", i), "ping");
                    service.send(&request).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(push.calls(), 16);
    }

    fn blank() -> impl Strategy<Value = Option<String>> {
        prop_oneof![Just(None), Just(Some(String::new()))]
    }

    fn present() -> impl Strategy<Value = Option<String>> {
        "[a-zA-Z0-9@+.]{1,16}".prop_map(Some)
    }

    fn field() -> impl Strategy<Value = Option<String>> {
        prop_oneof![blank(), present()]
    }

    proptest! {
        /// Any request missing type, destination or body never reaches a provider
        #[test]
        fn prop_incomplete_requests_never_reach_providers(
            notification_type in field(),
            to in field(),
            message in field(),
        ) {
            let incomplete = [&notification_type, &to, &message]
                .iter()
                .any(|f| f.as_deref().is_none_or(str::is_empty));
            prop_assume!(incomplete);

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let catch_all = [
                RecordingProvider::new("email", "EMAIL"),
                RecordingProvider::new("sms", "SMS"),
            ];
            let service = service_with(&catch_all);
            let request = NotificationRequest::from_parts(
                notification_type.clone(),
                to,
                None,
                message,
                None,
            );

            let result = runtime.block_on(service.send(&request));
            let is_invalid = matches!(result, Err(NotificationError::InvalidRequest { .. }));
            prop_assert!(is_invalid);
            prop_assert!(catch_all.iter().all(|p| p.calls() == 0));
        }

        /// Resolution ignores the case of the requested type
        #[test]
        fn prop_type_matching_ignores_case(upper in proptest::bool::ANY, lower_first in proptest::bool::ANY) {
            let requested = match (upper, lower_first) {
                (true, _) => "WHATSAPP".to_string(),
                (false, true) => "whatsapp".to_string(),
                (false, false) => "WhatsApp".to_string(),
            };

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let whatsapp = RecordingProvider::new("whatsapp", "WHATSAPP");
            let service = service_with(std::slice::from_ref(&whatsapp));
            let request = NotificationRequest::new(requested, "+15550001", "hi");

            prop_assert!(runtime.block_on(service.send(&request)).is_ok());
            prop_assert_eq!(whatsapp.calls(), 1);
        }
    }
}
