//! Health check DTOs for API responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "name": "notifier-rs",
    "version": "0.1.0",
    "timestamp": "2024-01-01T12:00:00Z",
    "providers": [
        { "name": "sendgrid", "notification_type": "EMAIL" }
    ]
}))]
pub struct HealthResponse {
    /// Overall health status
    #[schema(example = "healthy")]
    pub status: HealthStatus,
    /// Application name
    pub name: String,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Timestamp of the health check (RFC 3339)
    #[schema(value_type = String, format = DateTime, example = "2024-01-01T12:00:00Z")]
    pub timestamp: String,
    /// Providers in resolution order
    pub providers: Vec<ProviderInfo>,
}

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// At least one provider is wired
    Healthy,
    /// Running, but every send would fail with an unsupported channel
    Degraded,
}

/// One wired provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProviderInfo {
    #[schema(example = "sendgrid")]
    pub name: String,
    #[schema(example = "EMAIL")]
    pub notification_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Degraded).unwrap(), "\"degraded\"");
    }
}
