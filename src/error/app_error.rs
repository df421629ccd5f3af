use thiserror::Error;

use crate::config::ConfigError;
use crate::notifications::{NotificationError, ProviderError};

/// Application-wide error type for the HTTP and CLI surfaces.
///
/// Notification failures keep their kind so the API can map each one to its
/// own status code; everything unexpected collapses into `Internal`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Well-formed request that no provider can serve
    #[error("Unprocessable content: {message}")]
    UnprocessableContent { message: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The selected provider failed to transmit the notification
    #[error("Delivery failed: {notification_type} via {provider}")]
    Delivery {
        notification_type: String,
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl From<NotificationError> for AppError {
    fn from(error: NotificationError) -> Self {
        match error {
            NotificationError::InvalidRequest { field, reason } => {
                AppError::Validation { field, reason }
            }
            NotificationError::UnsupportedChannel { notification_type } => {
                AppError::UnprocessableContent {
                    message: format!(
                        "No provider available for notification type: {}",
                        notification_type
                    ),
                }
            }
            NotificationError::Configuration { key, message } => AppError::Configuration {
                key,
                source: anyhow::anyhow!(message),
            },
            NotificationError::DeliveryFailed {
                notification_type,
                provider,
                source,
            } => AppError::Delivery {
                notification_type,
                provider,
                source,
            },
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = error.key().unwrap_or_else(|| "settings".to_string());
        AppError::Configuration {
            key,
            source: error.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
