//! Provider registry and resolver.
//!
//! Holds the ordered set of providers wired at startup and maps a requested
//! notification type to the provider that serves it.

use std::fmt;
use std::sync::Arc;

use super::provider::NotificationProvider;

/// Ordered, read-only collection of providers.
///
/// Resolution scans providers in registration order and returns the first one
/// whose `supports` accepts the type. When two providers claim the same type
/// the first-registered one always wins; the later one is never reached.
/// Registration does not reject such a pair, it only logs a warning.
///
/// Cloning is cheap: the collection is shared behind an `Arc`.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Arc<Vec<Arc<dyn NotificationProvider>>>,
}

impl ProviderRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from providers in the given order
    pub fn from_providers(providers: Vec<Arc<dyn NotificationProvider>>) -> Self {
        providers
            .into_iter()
            .fold(RegistryBuilder::default(), RegistryBuilder::register)
            .build()
    }

    /// Starts an ordered registration
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the first provider supporting `notification_type`
    pub fn resolve(&self, notification_type: &str) -> Option<Arc<dyn NotificationProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.supports(notification_type))
            .cloned()
    }

    /// Provider names in registration order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Iterates providers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn NotificationProvider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}

/// Builder used during wiring; the finished registry is immutable
#[derive(Default)]
pub struct RegistryBuilder {
    providers: Vec<Arc<dyn NotificationProvider>>,
}

impl RegistryBuilder {
    /// Appends a provider after all previously registered ones
    pub fn register(mut self, provider: Arc<dyn NotificationProvider>) -> Self {
        if let Some(existing) = self
            .providers
            .iter()
            .find(|p| p.supports(provider.notification_type()))
        {
            tracing::warn!(
                notification_type = %provider.notification_type(),
                active = %existing.name(),
                shadowed = %provider.name(),
                "Provider is shadowed by an earlier registration for the same type"
            );
        }

        tracing::debug!(
            provider = %provider.name(),
            notification_type = %provider.notification_type(),
            position = self.providers.len(),
            "Provider registered"
        );
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            providers: Arc::new(self.providers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::error::ProviderResult;
    use crate::notifications::request::NotificationRequest;
    use async_trait::async_trait;

    struct Named {
        name: &'static str,
        tag: &'static str,
    }

    #[async_trait]
    impl NotificationProvider for Named {
        fn name(&self) -> &'static str {
            self.name
        }

        fn notification_type(&self) -> &str {
            self.tag
        }

        async fn send(&self, _request: &NotificationRequest) -> ProviderResult<()> {
            Ok(())
        }
    }

    fn named(name: &'static str, tag: &'static str) -> Arc<dyn NotificationProvider> {
        Arc::new(Named { name, tag })
    }

    #[test]
    fn test_resolve_by_type_case_insensitive() {
        let registry = ProviderRegistry::from_providers(vec![
            named("sendgrid", "EMAIL"),
            named("twilio-sms", "SMS"),
        ]);

        assert_eq!(registry.resolve("sms").unwrap().name(), "twilio-sms");
        assert_eq!(registry.resolve("Email").unwrap().name(), "sendgrid");
    }

    #[test]
    fn test_resolve_unknown_type() {
        let registry = ProviderRegistry::from_providers(vec![named("sendgrid", "EMAIL")]);
        assert!(registry.resolve("FAX").is_none());
        assert!(ProviderRegistry::new().resolve("EMAIL").is_none());
    }

    #[test]
    fn test_first_registered_wins_deterministically() {
        let registry = ProviderRegistry::builder()
            .register(named("primary", "EMAIL"))
            .register(named("secondary", "email"))
            .build();

        for _ in 0..10 {
            assert_eq!(registry.resolve("EMAIL").unwrap().name(), "primary");
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_provider_names_keep_order() {
        let registry = ProviderRegistry::from_providers(vec![
            named("b", "SMS"),
            named("a", "EMAIL"),
            named("c", "PUSH"),
        ]);
        assert_eq!(registry.provider_names(), vec!["b", "a", "c"]);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_clone_shares_providers() {
        let registry = ProviderRegistry::from_providers(vec![named("a", "EMAIL")]);
        let cloned = registry.clone();
        let a = registry.resolve("EMAIL").unwrap();
        let b = cloned.resolve("EMAIL").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
