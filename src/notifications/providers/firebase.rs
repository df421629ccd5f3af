//! Firebase Cloud Messaging push provider.
//!
//! Authenticates with a Google service account: a signed RS256 assertion is
//! exchanged for an OAuth2 access token, which then authorizes calls to the
//! FCM HTTP v1 `messages:send` endpoint.
//!
//! API Reference: https://firebase.google.com/docs/reference/fcm/rest/v1/projects.messages

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use super::{base_url, ensure_success};
use crate::notifications::activation::ProviderSettings;
use crate::notifications::error::{NotificationError, ProviderError, ProviderResult};
use crate::notifications::init_guard::InitGuard;
use crate::notifications::provider::NotificationProvider;
use crate::notifications::request::NotificationRequest;

const DEFAULT_BASE_URL: &str = "https://fcm.googleapis.com";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh the cached access token this long before it expires
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Deserialize)]
struct ServiceAccount {
    project_id: String,
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct SendResponse {
    name: Option<String>,
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Initialized Firebase application: service-account identity plus the
/// access token cache shared by every push provider instance.
pub struct FirebaseApp {
    project_id: String,
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    signing_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl FirebaseApp {
    /// Loads a service-account JSON key file
    pub fn from_credentials_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read credentials file {}", path.display()))?;
        Self::from_credentials_json(&raw)
    }

    pub fn from_credentials_json(raw: &str) -> anyhow::Result<Self> {
        let account: ServiceAccount =
            serde_json::from_str(raw).context("credentials are not a service account key")?;
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .context("service account private key is not a valid RSA PEM key")?;

        Ok(Self {
            project_id: account.project_id,
            client_email: account.client_email,
            key_id: account.private_key_id,
            token_uri: account
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            signing_key,
            token: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn signed_assertion(&self, now: i64) -> ProviderResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: MESSAGING_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| ProviderError::auth(format!("failed to sign token assertion: {}", e)))
    }

    /// Returns a valid access token, exchanging a fresh assertion when the
    /// cached one is missing or about to expire.
    async fn access_token(&self, http: &reqwest::Client) -> ProviderResult<String> {
        let mut cached = self.token.lock().await;
        let now = jiff::Timestamp::now().as_second();

        if let Some(token) = cached
            .as_ref()
            .filter(|t| t.expires_at - TOKEN_EXPIRY_MARGIN_SECS > now)
        {
            return Ok(token.value.clone());
        }

        let assertion = self.signed_assertion(now)?;
        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::undecodable("token response", e))?;

        tracing::debug!(client_email = %self.client_email, "Obtained Firebase access token");
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        });
        Ok(token.access_token)
    }
}

impl fmt::Debug for FirebaseApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseApp")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// Push provider backed by Firebase Cloud Messaging
///
/// # Settings
/// - `credentials_file` (required): path to a service-account JSON key
/// - `base_url`: FCM API root, defaults to `https://fcm.googleapis.com`
///
/// The Firebase application is initialized once per guard. Every provider
/// built against the same guard reuses it, whatever `credentials_file` it
/// was given.
#[derive(Debug)]
pub struct FirebaseProvider {
    http: reqwest::Client,
    app: Arc<FirebaseApp>,
    base_url: String,
}

impl FirebaseProvider {
    /// Creates the provider, initializing the shared Firebase app if needed
    ///
    /// # Errors
    /// `Configuration` if `credentials_file` is missing or initialization
    /// fails. A failed initialization is retried by the next constructor.
    pub fn new(
        settings: &ProviderSettings,
        http: reqwest::Client,
        guard: &InitGuard<Arc<FirebaseApp>>,
    ) -> Result<Self, NotificationError> {
        let credentials_file = settings.require("credentials_file")?;

        if guard.is_initialized() {
            tracing::debug!("Firebase already initialized, reusing application");
        }

        let app = guard
            .get_or_try_init(|| {
                let app = FirebaseApp::from_credentials_file(Path::new(credentials_file))?;
                tracing::info!(
                    project_id = %app.project_id(),
                    "Firebase Cloud Messaging initialized"
                );
                Ok::<_, anyhow::Error>(Arc::new(app))
            })
            .map_err(|e| {
                tracing::error!(error = %e, "Firebase initialization failed");
                NotificationError::configuration(
                    settings.key_path("credentials_file"),
                    format!("failed to initialize Firebase: {:#}", e),
                )
            })?
            .clone();

        Ok(Self {
            http,
            app,
            base_url: base_url(settings, DEFAULT_BASE_URL),
        })
    }

    /// Builds the FCM v1 message
    ///
    /// The subject becomes the notification title. `additional_data` object
    /// entries become the string-valued `data` map; non-string values are
    /// sent as their JSON text.
    fn build_message(&self, request: &NotificationRequest) -> Value {
        let mut notification = json!({ "body": request.message().unwrap_or_default() });
        if let Some(title) = request.non_empty_subject() {
            notification["title"] = json!(title);
        }

        let mut message = json!({
            "token": request.to().unwrap_or_default(),
            "notification": notification,
        });

        if let Some(Value::Object(extra)) = request.additional_data() {
            let data: Map<String, Value> = extra
                .iter()
                .map(|(k, v)| {
                    let text = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), Value::String(text))
                })
                .collect();
            message["data"] = Value::Object(data);
        }

        json!({ "message": message })
    }
}

#[async_trait]
impl NotificationProvider for FirebaseProvider {
    fn name(&self) -> &'static str {
        "firebase"
    }

    fn notification_type(&self) -> &str {
        "PUSH"
    }

    async fn send(&self, request: &NotificationRequest) -> ProviderResult<()> {
        let token = self.app.access_token(&self.http).await?;
        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.app.project_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&self.build_message(request))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::undecodable("response body", e))?;
        tracing::debug!(
            message_id = sent.name.as_deref().unwrap_or("unknown"),
            "FCM accepted push notification"
        );
        Ok(())
    }
}
