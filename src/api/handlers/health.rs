//! Health check endpoint handlers.
//!
//! The notifier has no backing store; health reflects whether any provider
//! was wired at startup.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{HealthResponse, HealthStatus, ProviderInfo};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /api/health` - Status, version and wired providers
/// - `GET /api/health/ready` - Readiness probe
/// - `GET /api/health/live` - Liveness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Basic health check endpoint.
///
/// Reports `degraded` when no provider is wired: the service runs, but
/// every notification would be rejected as unsupported.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers: Vec<ProviderInfo> = state
        .notifications
        .registry()
        .iter()
        .map(|provider| ProviderInfo {
            name: provider.name().to_string(),
            notification_type: provider.notification_type().to_string(),
        })
        .collect();

    let status = if providers.is_empty() {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    Json(HealthResponse {
        status,
        name: state.application.name.clone(),
        version: state.application.version.clone(),
        timestamp: jiff::Timestamp::now().to_string(),
        providers,
    })
}

/// Readiness probe endpoint.
///
/// Ready once at least one provider is wired.
#[utoipa::path(
    get,
    path = "/api/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "No provider is wired")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    if state.notifications.registry().is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Liveness probe endpoint.
#[utoipa::path(
    get,
    path = "/api/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}
