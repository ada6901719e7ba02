// Core push notification types shared by every component
// Device tokens, open intents, and the error taxonomy for the delivery subsystem

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod background;
pub mod config;
pub mod content;
pub mod coordinator;
pub mod deeplink;
pub mod lifecycle;
pub mod permission;
pub mod platform;
pub mod token_sync;

pub use background::{BackgroundOutcome, BackgroundPressHandler, register_background_handler};
pub use config::{ChannelConfig, PushConfig};
pub use content::{
    ChannelImportance, LocalEvent, LocalEventKind, LocalNotification, MessagePresentation,
    NotificationChannel, NotificationData, RemoteMessage,
};
pub use coordinator::{DisplayConfig, EventCoordinator, Handled, NotificationEvent, Reaction};
pub use deeplink::{DeepLinkAction, DeepLinkDispatcher, DispatchOutcome, RouteParams, resolve};
pub use lifecycle::{LifecycleController, LifecycleState, StartOutcome, StartReport};
pub use permission::PermissionInitializer;
pub use platform::{
    AuthTokenSource, AuthorizationStatus, BoxFuture, DeviceRegistry, EventHandler, LinkOpener,
    LocalRenderer, Navigator, PushPlatform, RuntimePermission, Subscription, handler,
};
pub use token_sync::{TokenOutcome, TokenSynchronizer};

/// Operating system family a device token was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePlatform {
    Android,
    Ios,
}

impl DevicePlatform {
    /// Platform of the running build; anything that is not iOS registers as Android
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            DevicePlatform::Ios
        } else {
            DevicePlatform::Android
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePlatform::Android => "android",
            DevicePlatform::Ios => "ios",
        }
    }

    /// Android is the only platform with notification channels
    pub fn uses_channels(&self) -> bool {
        matches!(self, DevicePlatform::Android)
    }
}

impl Default for DevicePlatform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for DevicePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DevicePlatform {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(DevicePlatform::Android),
            "ios" => Ok(DevicePlatform::Ios),
            other => Err(PushError::Config {
                field: "platform".to_string(),
                message: format!("unknown platform '{}'", other),
            }),
        }
    }
}

/// Token issued by the platform push service for this install.
/// Mirrored to the backend, never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceToken {
    #[serde(rename = "token")]
    pub value: String,
    pub platform: DevicePlatform,
}

impl DeviceToken {
    pub fn new(value: impl Into<String>, platform: DevicePlatform) -> Self {
        Self {
            value: value.into(),
            platform,
        }
    }
}

/// Unique identifier assigned to each open intent for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentId(Uuid);

impl IntentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event source an open intent was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentSource {
    /// Tap that cold-started the process
    InitialNotification,
    /// Tap while the app was backgrounded
    OpenedFromBackground,
    /// Tap on a notification the app rendered itself while in the foreground
    LocalPress,
}

impl IntentSource {
    pub fn name(&self) -> &'static str {
        match self {
            IntentSource::InitialNotification => "initial_notification",
            IntentSource::OpenedFromBackground => "opened_from_background",
            IntentSource::LocalPress => "local_press",
        }
    }
}

/// Normalized notification-open event.
///
/// Immutable once built. The resolver takes it by value, so a single intent
/// can only ever be dispatched once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenIntent {
    id: IntentId,
    source: IntentSource,
    data: NotificationData,
    received_at: DateTime<Utc>,
}

impl OpenIntent {
    pub fn new(source: IntentSource, data: NotificationData) -> Self {
        Self {
            id: IntentId::generate(),
            source,
            data,
            received_at: Utc::now(),
        }
    }

    pub fn id(&self) -> IntentId {
        self.id
    }

    pub fn source(&self) -> IntentSource {
        self.source
    }

    pub fn data(&self) -> &NotificationData {
        &self.data
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn into_data(self) -> NotificationData {
        self.data
    }
}

/// Error types for the push subsystem.
///
/// None of these cross the `start`/`stop` boundary; they are logged and
/// folded into [`Outcome`] values at the smallest scope that can see them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    #[error("permission request for {permission} failed: {message}")]
    Permission { permission: String, message: String },
    #[error("device token unavailable: {0}")]
    TokenUnavailable(String),
    #[error("device registration rejected with HTTP {status}: {message}")]
    RegistrationRejected { status: u16, message: String },
    #[error("device registration transport error: {0}")]
    Transport(String),
    #[error("no credentials available for device registration")]
    NotAuthenticated,
    #[error("could not open link {url}: {message}")]
    LinkOpen { url: String, message: String },
    #[error("platform error in {operation}: {message}")]
    Platform { operation: String, message: String },
    #[error("configuration error in {field}: {message}")]
    Config { field: String, message: String },
}

impl PushError {
    pub fn platform(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        PushError::Platform {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Backend refusals that happen in normal flows (validation, expired auth)
    pub fn is_expected(&self) -> bool {
        match self {
            PushError::RegistrationRejected { status, .. } => matches!(status, 400 | 401 | 403),
            PushError::NotAuthenticated | PushError::TokenUnavailable(_) => true,
            _ => false,
        }
    }
}

pub type PushResult<T> = Result<T, PushError>;

/// Settled result of a fire-and-forget external call.
///
/// Callers are free to discard it; no retry is ever attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed(PushError),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// Settle a result, logging the failure under `operation`
    pub fn settle(operation: &'static str, result: PushResult<()>) -> Self {
        match result {
            Ok(()) => Outcome::Completed,
            Err(error) => {
                if error.is_expected() {
                    tracing::debug!(operation, error = %error, "push operation skipped");
                } else {
                    tracing::warn!(operation, error = %error, "push operation failed");
                }
                Outcome::Failed(error)
            },
        }
    }
}
