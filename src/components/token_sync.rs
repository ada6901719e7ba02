// Device token synchronization with the backend
// At most one registration call per event; the next refresh or restart is the retry.

use std::sync::Arc;

use super::platform::{DeviceRegistry, EventHandler, PushPlatform, Subscription, handler};
use super::{DevicePlatform, DeviceToken, Outcome, PushError};

/// Result of syncing the current token on start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// Platform service has no token yet
    Unavailable,
    Registered(DeviceToken),
    Failed(DeviceToken, PushError),
}

#[derive(Clone)]
pub struct TokenSynchronizer {
    platform: Arc<dyn PushPlatform>,
    registry: Arc<dyn DeviceRegistry>,
    device_platform: DevicePlatform,
}

impl TokenSynchronizer {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        registry: Arc<dyn DeviceRegistry>,
        device_platform: DevicePlatform,
    ) -> Self {
        Self {
            platform,
            registry,
            device_platform,
        }
    }

    pub async fn sync_current_token(&self) -> TokenOutcome {
        let value = match self.platform.current_token().await {
            Ok(Some(value)) if !value.trim().is_empty() => value,
            Ok(_) => {
                tracing::debug!("no device token yet, skipping registration");
                return TokenOutcome::Unavailable;
            },
            Err(error) => {
                tracing::debug!(error = %error, "device token fetch failed, skipping registration");
                return TokenOutcome::Unavailable;
            },
        };

        let token = DeviceToken::new(value, self.device_platform);
        match self.register_token(&token).await {
            Outcome::Completed => TokenOutcome::Registered(token),
            Outcome::Failed(error) => TokenOutcome::Failed(token, error),
        }
    }

    /// Single registration attempt; failures are settled, never retried
    pub async fn register_token(&self, token: &DeviceToken) -> Outcome {
        let outcome = Outcome::settle("register_device_token", self.registry.register(token).await);
        if outcome.is_completed() {
            tracing::info!(platform = %token.platform, "device token registered");
        }
        outcome
    }

    /// Subscribe to token rotation, registering each new token once
    pub fn subscribe_refresh(&self) -> Subscription {
        self.platform.on_token_refresh(self.refresh_handler())
    }

    fn refresh_handler(&self) -> EventHandler<String> {
        let sync = self.clone();
        handler(move |value: String| {
            let sync = sync.clone();
            async move {
                if value.trim().is_empty() {
                    return;
                }
                let token = DeviceToken::new(value, sync.device_platform);
                let _ = sync.register_token(&token).await;
            }
        })
    }
}
