//! Error handler for converting AppError to HTTP responses.
//!
//! This module implements the IntoResponse trait for AppError and a
//! middleware that gives every error response the same JSON shape,
//! including errors produced by axum itself (unknown route, bad method,
//! extractor rejections).

use axum::{
    Json,
    extract::{
        Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{
        StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - Validation → 400 BAD_REQUEST
    /// - BadRequest → 400 BAD_REQUEST
    /// - UnprocessableContent → 422 UNPROCESSABLE_ENTITY
    /// - Configuration → 500 INTERNAL_SERVER_ERROR
    /// - Delivery → 502 BAD_GATEWAY
    /// - Internal → 500 INTERNAL_SERVER_ERROR
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        let error_response = match &self {
            AppError::Validation { field, reason } => ErrorResponse::validation_error(field, reason),
            AppError::BadRequest { message } | AppError::UnprocessableContent { message } => {
                ErrorResponse::new(code, message)
            }
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = %source, "Configuration error");
                ErrorResponse::new(code, &format!("Configuration error: {}", key))
                    .with_details(json!({ "key": key }))
            }
            AppError::Delivery {
                notification_type,
                provider,
                source,
            } => {
                tracing::error!(
                    notification_type = %notification_type,
                    provider = %provider,
                    error = %source,
                    "Notification delivery failed"
                );
                ErrorResponse::new(
                    code,
                    &format!(
                        "Failed to deliver {} notification via {}",
                        notification_type, provider
                    ),
                )
                .with_details(json!({
                    "notification_type": notification_type,
                    "provider": provider,
                    "cause": source.to_string(),
                }))
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal error");
                ErrorResponse::new(code, "An internal error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let summary = match &rejection {
            JsonRejection::JsonDataError(_) => "Invalid JSON format",
            JsonRejection::JsonSyntaxError(_) => "JSON syntax error",
            JsonRejection::MissingJsonContentType(_) => {
                "Missing or invalid Content-Type header, expected application/json"
            }
            JsonRejection::BytesRejection(_) => "Failed to read request body",
            _ => "Failed to parse JSON request",
        };
        AppError::BadRequest {
            message: format!("{}: {}", summary, rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest {
            message: format!("Invalid query parameters: {}", rejection.body_text()),
        }
    }
}

/// Global error handling middleware.
///
/// Error responses that are not already an `ErrorResponse` are rewritten
/// into one, and the request ID is attached to every error body. Headers
/// of the original response (e.g. `allow` on 405) are kept.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|id| id.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let mut error_response = is_json
        .then(|| serde_json::from_slice::<ErrorResponse>(&body_bytes).ok())
        .flatten()
        .unwrap_or_else(|| {
            fallback_error(status, String::from_utf8_lossy(&body_bytes).trim())
        });

    if error_response.request_id.is_none() {
        if let Some(id) = &request_id {
            error_response = error_response.with_request_id(id);
        }
    }

    let mut normalized = (status, Json(error_response)).into_response();
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            normalized.headers_mut().append(name.clone(), value.clone());
        }
    }
    normalized
}

/// Error body for responses that did not come from an `AppError`
fn fallback_error(status: StatusCode, original_message: &str) -> ErrorResponse {
    let (code, default_message) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::UNPROCESSABLE_ENTITY => ("UNPROCESSABLE_CONTENT", "Unprocessable content"),
        StatusCode::INTERNAL_SERVER_ERROR => {
            ("INTERNAL_SERVER_ERROR", "An internal server error occurred")
        }
        StatusCode::BAD_GATEWAY => ("BAD_GATEWAY", "Bad gateway"),
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        _ if status.is_client_error() => ("CLIENT_ERROR", "The request could not be processed"),
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    let message = if original_message.is_empty() {
        default_message
    } else {
        original_message
    };
    ErrorResponse::new(code, message)
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::UnprocessableContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Delivery { .. } => StatusCode::BAD_GATEWAY,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::Validation { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::UnprocessableContent { .. } => "UNSUPPORTED_CHANNEL",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Delivery { .. } => "DELIVERY_FAILED",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::{NotificationError, ProviderError};
    use axum::{Router, body::Body, middleware, routing::post};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_notification_errors_map_to_statuses() {
        let cases = [
            (
                NotificationError::invalid_request("to", "must not be empty"),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                NotificationError::unsupported_channel("FAX"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNSUPPORTED_CHANNEL",
            ),
            (
                NotificationError::configuration("channels.sms.providers.twilio.from", "missing"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
            ),
            (
                NotificationError::DeliveryFailed {
                    notification_type: "EMAIL".to_string(),
                    provider: "sendgrid".to_string(),
                    source: ProviderError::status(401, "bad key"),
                },
                StatusCode::BAD_GATEWAY,
                "DELIVERY_FAILED",
            ),
        ];

        for (error, status, code) in cases {
            let app_error = AppError::from(error);
            assert_eq!(error_to_status_code(&app_error), status);
            assert_eq!(error_to_code(&app_error), code);
        }
    }

    #[tokio::test]
    async fn test_delivery_failure_body_names_provider_and_cause() {
        let error = AppError::from(NotificationError::DeliveryFailed {
            notification_type: "SMS".to_string(),
            provider: "twilio-sms".to_string(),
            source: ProviderError::status(400, "invalid number"),
        });

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["code"], "DELIVERY_FAILED");
        assert_eq!(json["details"]["provider"], "twilio-sms");
        assert!(json["details"]["cause"].as_str().unwrap().contains("invalid number"));
    }

    #[tokio::test]
    async fn test_delivery_failure_body_omits_request_url() {
        let transport = reqwest::Client::new()
            .post("http://127.0.0.1:9/bot123:TOPSECRET/sendMessage")
            .send()
            .await
            .unwrap_err();
        let error = AppError::from(NotificationError::DeliveryFailed {
            notification_type: "TELEGRAM".to_string(),
            provider: "telegram-bot".to_string(),
            source: ProviderError::from(transport),
        });

        let json = body_json(error.into_response()).await;
        assert_eq!(json["code"], "DELIVERY_FAILED");
        assert!(!json.to_string().contains("TOPSECRET"));
    }

    #[tokio::test]
    async fn test_internal_error_is_sanitized() {
        let error = AppError::from(anyhow::anyhow!("secret connection string"));
        let json = body_json(error.into_response()).await;
        assert_eq!(json["message"], "An internal error occurred");
        assert!(!json.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_json_rejection_is_bad_request() {
        use axum::extract::rejection::MissingJsonContentType;

        let rejection = JsonRejection::MissingJsonContentType(MissingJsonContentType::default());
        let response = AppError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_global_handler_rewrites_plain_errors() {
        let app = Router::new()
            .route("/only-post", post(|| async { "ok" }))
            .layer(middleware::from_fn(global_error_handler))
            .layer(axum::Extension(RequestId("req-9".to_string())));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/only-post")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key("allow"));
        assert_eq!(body_json(response).await["code"], "METHOD_NOT_ALLOWED");
    }

    #[test]
    fn test_fallback_prefers_original_message() {
        let response = fallback_error(StatusCode::BAD_REQUEST, "Failed to deserialize query");
        assert_eq!(response.message, "Failed to deserialize query");
        let response = fallback_error(StatusCode::NOT_FOUND, "");
        assert_eq!(response.message, "The requested resource was not found");
    }
}
