//! Notification dispatch with pluggable providers.
//!
//! A `NotificationRequest` is validated by the `NotificationService`, routed
//! through the `ProviderRegistry` to the provider whose type tag matches and
//! sent exactly once. Which providers exist is decided at startup by the
//! activation policy from the `channels` configuration.

pub mod activation;
pub mod error;
pub mod init_guard;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod request;
pub mod service;

pub use activation::{Channel, ProviderContext, ProviderSettings, build_registry, should_activate};
pub use error::{NotificationError, ProviderError, ProviderResult};
pub use init_guard::InitGuard;
pub use provider::NotificationProvider;
pub use registry::{ProviderRegistry, RegistryBuilder};
pub use request::{NotificationRequest, ValidatedRequest};
pub use service::NotificationService;
