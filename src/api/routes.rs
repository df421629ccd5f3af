//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the notifier.

use std::time::Duration;

use axum::{Json, Router, http::StatusCode, middleware, routing::get};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::api::doc::{ApiDoc, OPENAPI_PATH};
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::config::settings::ServerConfig;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. CORS and compression
/// 2. Request ID middleware - generates/propagates request IDs
/// 3. Logging middleware - logs requests with request IDs
/// 4. Error handler - normalizes error bodies and attaches the request ID
/// 5. Request timeout from `server.request_timeout`
///
/// # Routes
/// - `/api/notifications` - Dispatch endpoints
/// - `/api/health` - Health probes
/// - `/api-docs/openapi.json` - Generated OpenAPI document
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::notifications::notification_routes())
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .route(
            OPENAPI_PATH,
            get(move || {
                let api = api.clone();
                async move { Json(api) }
            }),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout),
        ))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
