// Collaborator seams for the push subsystem
// Platform push service, local renderer, navigator, link opener and device registry
// are all external; host bindings implement these traits.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::content::{LocalEvent, LocalNotification, NotificationChannel, RemoteMessage};
use super::deeplink::RouteParams;
use super::{DeviceToken, PushResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback registered with an event source. The host binding drives the
/// returned future to completion on its own runtime.
pub type EventHandler<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure as an [`EventHandler`]
pub fn handler<T, F, Fut>(f: F) -> EventHandler<T>
where
    T: 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |event: T| -> BoxFuture<'static, ()> { Box::pin(f(event)) })
}

/// Teardown handle returned by every event source registration.
///
/// The teardown runs exactly once, on [`Subscription::cancel`] or on drop.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Handle for sources that cannot be unsubscribed
    pub fn noop() -> Self {
        Self { teardown: None }
    }

    pub fn cancel(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("armed", &self.teardown.is_some())
            .finish()
    }
}

/// Runtime permissions some platforms require before notifications render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuntimePermission {
    /// Android 13+ `POST_NOTIFICATIONS`
    PostNotifications,
    /// Legacy storage/media access on older Android releases
    MediaStorage,
}

impl RuntimePermission {
    pub fn name(&self) -> &'static str {
        match self {
            RuntimePermission::PostNotifications => "post_notifications",
            RuntimePermission::MediaStorage => "media_storage",
        }
    }
}

/// Push authorization reported by the platform service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

impl AuthorizationStatus {
    pub fn may_display(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::Authorized | AuthorizationStatus::Provisional
        )
    }
}

/// Platform push service (FCM/APNs binding)
pub trait PushPlatform: Send + Sync {
    fn requires_runtime_permission(&self, permission: RuntimePermission) -> bool;

    fn request_runtime_permission(
        &self,
        permission: RuntimePermission,
    ) -> BoxFuture<'_, PushResult<bool>>;

    fn request_authorization(&self) -> BoxFuture<'_, PushResult<AuthorizationStatus>>;

    /// Current token, `None` while the service is not ready yet
    fn current_token(&self) -> BoxFuture<'_, PushResult<Option<String>>>;

    /// Message whose tap launched the process from the killed state
    fn initial_notification(&self) -> BoxFuture<'_, PushResult<Option<RemoteMessage>>>;

    fn on_token_refresh(&self, handler: EventHandler<String>) -> Subscription;

    fn on_message(&self, handler: EventHandler<RemoteMessage>) -> Subscription;

    fn on_notification_opened(&self, handler: EventHandler<RemoteMessage>) -> Subscription;

    /// Process-scope hook for data messages received while not running
    fn set_background_message_handler(&self, handler: EventHandler<RemoteMessage>);
}

/// Local notification renderer (notifee-style binding)
pub trait LocalRenderer: Send + Sync {
    fn create_channel<'a>(&'a self, channel: &'a NotificationChannel)
    -> BoxFuture<'a, PushResult<()>>;

    /// Render a notification, returning the renderer's id for it
    fn display(&self, notification: LocalNotification) -> BoxFuture<'_, PushResult<String>>;

    fn on_foreground_event(&self, handler: EventHandler<LocalEvent>) -> Subscription;

    /// Process-scope hook; registrations are never removed
    fn on_background_event(&self, handler: EventHandler<LocalEvent>);
}

/// In-app navigation invocation contract
pub trait Navigator: Send + Sync {
    fn is_ready(&self) -> bool;

    fn navigate(&self, route: &str, params: Option<&RouteParams>);
}

/// System link opener
pub trait LinkOpener: Send + Sync {
    fn open<'a>(&'a self, url: &'a str) -> BoxFuture<'a, PushResult<()>>;
}

/// Remote device-registration endpoint
pub trait DeviceRegistry: Send + Sync {
    fn register<'a>(&'a self, token: &'a DeviceToken) -> BoxFuture<'a, PushResult<()>>;
}

/// Source of the bearer credential for authenticated registration calls
pub trait AuthTokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

impl<F> AuthTokenSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}
