// Notification permission and default channel provisioning
// Denial degrades display capability; it is never an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::DevicePlatform;
use super::content::NotificationChannel;
use super::platform::{LocalRenderer, PushPlatform, RuntimePermission};

pub struct PermissionInitializer {
    platform: Arc<dyn PushPlatform>,
    renderer: Arc<dyn LocalRenderer>,
    channel: NotificationChannel,
    device_platform: DevicePlatform,
    channel_ready: AtomicBool,
}

impl PermissionInitializer {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        renderer: Arc<dyn LocalRenderer>,
        channel: NotificationChannel,
        device_platform: DevicePlatform,
    ) -> Self {
        Self {
            platform,
            renderer,
            channel,
            device_platform,
            channel_ready: AtomicBool::new(false),
        }
    }

    /// Request everything needed to display notifications.
    ///
    /// Returns whether the app may display notifications.
    pub async fn ensure_permission(&self) -> bool {
        let runtime_granted = self
            .request_runtime(RuntimePermission::PostNotifications)
            .await;

        // Only photo handling depends on storage access
        let media_granted = self.request_runtime(RuntimePermission::MediaStorage).await;

        let authorized = match self.platform.request_authorization().await {
            Ok(status) => {
                tracing::debug!(status = ?status, "push authorization status");
                status.may_display()
            },
            Err(error) => {
                tracing::warn!(error = %error, "push authorization request failed");
                false
            },
        };

        let may_display = runtime_granted && authorized;
        if !may_display {
            tracing::info!(
                runtime_granted,
                authorized,
                media_granted,
                "notifications will not be displayed"
            );
        }
        may_display
    }

    async fn request_runtime(&self, permission: RuntimePermission) -> bool {
        if !self.platform.requires_runtime_permission(permission) {
            return true;
        }
        match self.platform.request_runtime_permission(permission).await {
            Ok(granted) => granted,
            Err(error) => {
                tracing::warn!(
                    permission = permission.name(),
                    error = %error,
                    "runtime permission request failed"
                );
                false
            },
        }
    }

    /// Provision the default channel once; later calls are no-ops
    pub async fn ensure_channel(&self) {
        if !self.device_platform.uses_channels() || self.channel_ready.load(Ordering::Acquire) {
            return;
        }
        match self.renderer.create_channel(&self.channel).await {
            Ok(()) => {
                self.channel_ready.store(true, Ordering::Release);
                tracing::debug!(channel = %self.channel.id, "notification channel ready");
            },
            Err(error) => {
                tracing::warn!(channel = %self.channel.id, error = %error, "failed to create notification channel");
            },
        }
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    pub fn channel_ready(&self) -> bool {
        self.channel_ready.load(Ordering::Acquire)
    }
}
