// Device registration over the REST API
// Single authenticated POST per call; the response is only inspected for logging.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::components::config::PushConfig;
use crate::components::platform::{AuthTokenSource, BoxFuture, DeviceRegistry};
use crate::components::{DevicePlatform, DeviceToken, PushError, PushResult};

/// Longest error body kept in a rejection message
const MAX_ERROR_BODY: usize = 256;

/// Standard API envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Push device record echoed back by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPushDevice {
    pub token: String,
    pub platform: DevicePlatform,
    #[serde(default)]
    pub is_active: bool,
    pub last_seen_at: Option<String>,
}

pub struct HttpDeviceRegistry {
    client: reqwest::Client,
    endpoint: Url,
    auth: Arc<dyn AuthTokenSource>,
}

impl HttpDeviceRegistry {
    pub fn new(config: &PushConfig, auth: Arc<dyn AuthTokenSource>) -> PushResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PushError::Config {
                field: "http_client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::with_client(client, config.registration_url()?, auth))
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: Url,
        auth: Arc<dyn AuthTokenSource>,
    ) -> Self {
        Self {
            client,
            endpoint,
            auth,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, token: &DeviceToken) -> PushResult<()> {
        let bearer = self
            .auth
            .bearer_token()
            .filter(|t| !t.is_empty())
            .ok_or(PushError::NotAuthenticated)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(bearer)
            .json(token)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::RegistrationRejected {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY),
            });
        }

        match response.json::<ApiEnvelope<ApiPushDevice>>().await {
            Ok(ApiEnvelope {
                data: Some(device), ..
            }) => {
                tracing::debug!(
                    platform = %device.platform,
                    is_active = device.is_active,
                    last_seen_at = ?device.last_seen_at,
                    "backend acknowledged push device"
                );
            },
            Ok(envelope) => {
                tracing::debug!(message = ?envelope.message, "push device registered without record");
            },
            Err(error) => {
                tracing::debug!(error = %error, "unreadable registration response ignored");
            },
        }
        Ok(())
    }
}

impl DeviceRegistry for HttpDeviceRegistry {
    fn register<'a>(&'a self, token: &'a DeviceToken) -> BoxFuture<'a, PushResult<()>> {
        Box::pin(self.post(token))
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
