// Event source coordination
// Four platform event sources are normalized into open intents (or a local display)
// and forwarded to the deep-link dispatcher.

use std::sync::Arc;

use super::content::{LocalEvent, LocalNotification, RemoteMessage};
use super::deeplink::{DeepLinkDispatcher, DispatchOutcome};
use super::platform::{LocalRenderer, PushPlatform, Subscription, handler};
use super::{IntentSource, OpenIntent};

/// Settings the display bridge stamps onto locally rendered notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub channel_id: String,
    pub fallback_title: String,
}

/// A raw event from one of the four sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    InitialNotification(RemoteMessage),
    OpenedFromBackground(RemoteMessage),
    LocalPress(LocalEvent),
    ForegroundMessage(RemoteMessage),
}

/// What the coordinator does with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Open(OpenIntent),
    /// Foreground messages have no open semantics until the user taps them
    Display(LocalNotification),
    Ignore,
}

impl NotificationEvent {
    pub fn into_reaction(self, display: &DisplayConfig) -> Reaction {
        match self {
            NotificationEvent::InitialNotification(message) => {
                Reaction::Open(OpenIntent::new(IntentSource::InitialNotification, message.data))
            },
            NotificationEvent::OpenedFromBackground(message) => {
                Reaction::Open(OpenIntent::new(IntentSource::OpenedFromBackground, message.data))
            },
            NotificationEvent::LocalPress(event) if event.is_press() => {
                Reaction::Open(OpenIntent::new(IntentSource::LocalPress, event.into_data()))
            },
            NotificationEvent::LocalPress(_) => Reaction::Ignore,
            NotificationEvent::ForegroundMessage(message) => {
                Reaction::Display(render_foreground(message, display))
            },
        }
    }
}

/// Build the local notification for a foreground message, keeping its data intact
fn render_foreground(message: RemoteMessage, display: &DisplayConfig) -> LocalNotification {
    let title = message
        .title()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(display.fallback_title.as_str())
        .to_string();
    let body = message.body().unwrap_or_default().to_string();

    LocalNotification {
        id: message.message_id,
        title,
        body,
        channel_id: display.channel_id.clone(),
        data: message.data,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Dispatched(DispatchOutcome),
    /// Rendered locally, with the renderer's id when display succeeded
    Displayed(Option<String>),
    Ignored,
}

struct CoordinatorInner {
    platform: Arc<dyn PushPlatform>,
    renderer: Arc<dyn LocalRenderer>,
    dispatcher: DeepLinkDispatcher,
    display: DisplayConfig,
}

impl CoordinatorInner {
    async fn handle(&self, event: NotificationEvent) -> Handled {
        match event.into_reaction(&self.display) {
            Reaction::Open(intent) => Handled::Dispatched(self.dispatcher.dispatch(intent).await),
            Reaction::Display(notification) => {
                match self.renderer.display(notification).await {
                    Ok(id) => Handled::Displayed(Some(id)),
                    Err(error) => {
                        tracing::warn!(error = %error, "failed to display foreground message");
                        Handled::Displayed(None)
                    },
                }
            },
            Reaction::Ignore => Handled::Ignored,
        }
    }
}

#[derive(Clone)]
pub struct EventCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl EventCoordinator {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        renderer: Arc<dyn LocalRenderer>,
        dispatcher: DeepLinkDispatcher,
        display: DisplayConfig,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                platform,
                renderer,
                dispatcher,
                display,
            }),
        }
    }

    pub async fn handle(&self, event: NotificationEvent) -> Handled {
        self.inner.handle(event).await
    }

    /// Dispatch the tap that cold-started the process, if any.
    /// Must complete before the live subscriptions are installed.
    pub async fn check_initial_notification(&self) -> Option<DispatchOutcome> {
        let message = match self.inner.platform.initial_notification().await {
            Ok(Some(message)) => message,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(error = %error, "initial notification check failed");
                return None;
            },
        };

        tracing::info!("process launched from notification");
        match self
            .inner
            .handle(NotificationEvent::InitialNotification(message))
            .await
        {
            Handled::Dispatched(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn subscribe_opened_app(&self) -> Subscription {
        let inner = Arc::clone(&self.inner);
        self.inner
            .platform
            .on_notification_opened(handler(move |message: RemoteMessage| {
                let inner = Arc::clone(&inner);
                async move {
                    inner
                        .handle(NotificationEvent::OpenedFromBackground(message))
                        .await;
                }
            }))
    }

    pub fn subscribe_local_press(&self) -> Subscription {
        let inner = Arc::clone(&self.inner);
        self.inner
            .renderer
            .on_foreground_event(handler(move |event: LocalEvent| {
                let inner = Arc::clone(&inner);
                async move {
                    inner.handle(NotificationEvent::LocalPress(event)).await;
                }
            }))
    }

    pub fn subscribe_foreground_messages(&self) -> Subscription {
        let inner = Arc::clone(&self.inner);
        self.inner
            .platform
            .on_message(handler(move |message: RemoteMessage| {
                let inner = Arc::clone(&inner);
                async move {
                    inner
                        .handle(NotificationEvent::ForegroundMessage(message))
                        .await;
                }
            }))
    }
}
