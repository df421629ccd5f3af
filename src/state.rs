//! Application state for Axum web framework.
//!
//! Contains the shared dispatcher and the application metadata that
//! request handlers need.

use std::sync::Arc;

use crate::config::settings::ApplicationConfig;
use crate::notifications::NotificationService;

/// Application state shared by all request handlers.
///
/// Cloning is cheap: the dispatcher holds its providers behind `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Dispatcher over the providers wired at startup
    pub notifications: NotificationService,
    /// Name and version reported by the health endpoint
    pub application: Arc<ApplicationConfig>,
}

impl AppState {
    pub fn new(notifications: NotificationService, application: ApplicationConfig) -> Self {
        Self {
            notifications,
            application: Arc::new(application),
        }
    }
}
