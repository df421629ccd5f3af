//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `notification` - Dispatch request/response DTOs
//! - `health` - Health check DTOs
//! - `error` - Common error response DTOs

mod error;
mod health;
mod notification;

pub use error::ErrorResponse;
pub use health::{HealthResponse, HealthStatus, ProviderInfo};
pub use notification::{
    EmailQuery, PushQuery, SendNotificationRequest, SendNotificationResponse, SmsQuery,
};
