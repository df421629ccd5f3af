//! Server module for managing HTTP server lifecycle
//!
//! This module handles provider wiring, server startup, and graceful shutdown.

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::create_router;
use crate::config::{Environment, settings::Settings};
use crate::error::{AppError, AppResult};
use crate::external::build_http_client;
use crate::notifications::{NotificationService, ProviderContext, build_registry};
use crate::state::AppState;

/// Wires the providers selected by `[channels]` into a dispatcher.
///
/// Fails if the HTTP client cannot be built or an active provider is
/// missing a required setting.
pub fn build_notification_service(settings: &Settings) -> AppResult<NotificationService> {
    let http = build_http_client(&settings.http).map_err(|e| AppError::Internal {
        source: anyhow::Error::new(e).context("Failed to build HTTP client"),
    })?;
    let context = ProviderContext::new(http);
    let registry = build_registry(&settings.channels, &context)?;
    Ok(NotificationService::new(registry))
}

/// HTTP server manager
pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Start the server and run until shutdown signal
    ///
    /// # Errors
    /// - Provider wiring errors (missing settings, bad credentials file)
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.environment,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            keep_alive_timeout = %self.settings.server.keep_alive_timeout,
            "Server configuration loaded"
        );

        let service = build_notification_service(&self.settings).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to wire notification providers");
        })?;
        tracing::info!(
            providers = ?service.registry().provider_names(),
            "Notification providers wired"
        );

        let state = AppState::new(service, self.settings.application.clone());
        let router = create_router(state, &self.settings.server);

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// A signal handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
