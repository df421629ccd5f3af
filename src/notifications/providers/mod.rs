//! Concrete notification providers.
//!
//! Each provider wraps one external messaging API and serves a single type
//! tag. All of them share the process-wide `reqwest::Client` handed in by the
//! activation policy.

mod firebase;
mod sendgrid;
mod telegram;
mod twilio;

pub use firebase::{FirebaseApp, FirebaseProvider};
pub use sendgrid::SendGridProvider;
pub use telegram::TelegramProvider;
pub use twilio::{TwilioSmsProvider, TwilioWhatsAppProvider};

use super::activation::ProviderSettings;
use super::error::{ProviderError, ProviderResult};

const BASE_URL: &str = "base_url";

/// API root for a provider: the `base_url` setting, or `default`
fn base_url(settings: &ProviderSettings, default: &str) -> String {
    settings
        .optional(BASE_URL)
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// Passes successful responses through and turns any other status into
/// `ProviderError::Status` carrying the response body.
async fn ensure_success(response: reqwest::Response) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::status(status.as_u16(), body))
}
