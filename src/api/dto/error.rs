//! Error response DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Standard error response format.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "code": "VALIDATION_ERROR",
    "message": "Validation failed for to: must not be empty",
    "details": { "field": "to", "reason": "must not be empty" },
    "request_id": "5f0c6f2e-8d8a-4b8e-9a57-3c1f0b0e2a11"
}))]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    /// Creates a field validation error.
    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::new(
            "VALIDATION_ERROR",
            &format!("Validation failed for {}: {}", field, reason),
        )
        .with_details(serde_json::json!({ "field": field, "reason": reason }))
    }

    /// Adds details to the error response.
    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}
