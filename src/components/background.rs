// Detached background press handler
// Registered once per process, independently of any LifecycleController. It may run
// in a process image where no navigator exists, so it only ever opens links.

use std::sync::{Arc, OnceLock};

use super::content::{LocalEvent, NotificationData, RemoteMessage};
use super::deeplink::{DispatchOutcome, open_link};
use super::platform::{LinkOpener, LocalRenderer, PushPlatform, handler};

static REGISTRATION: OnceLock<()> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundOutcome {
    LinkOpened(String),
    LinkFailed(String),
    Ignored,
}

#[derive(Clone)]
pub struct BackgroundPressHandler {
    opener: Arc<dyn LinkOpener>,
}

impl BackgroundPressHandler {
    pub fn new(opener: Arc<dyn LinkOpener>) -> Self {
        Self { opener }
    }

    pub async fn handle(&self, event: LocalEvent) -> BackgroundOutcome {
        if !event.is_press() {
            return BackgroundOutcome::Ignored;
        }
        let Some(url) = event
            .data()
            .and_then(|data| data.non_empty(NotificationData::URL))
            .map(str::to_string)
        else {
            return BackgroundOutcome::Ignored;
        };

        match open_link(self.opener.as_ref(), url).await {
            DispatchOutcome::LinkOpened(url) => BackgroundOutcome::LinkOpened(url),
            DispatchOutcome::LinkFailed(error) => BackgroundOutcome::LinkFailed(error.to_string()),
            _ => BackgroundOutcome::Ignored,
        }
    }
}

/// Register the process-wide background hooks.
///
/// Only the first call in a process registers anything; it returns `true`.
pub fn register_background_handler(
    platform: &dyn PushPlatform,
    renderer: &dyn LocalRenderer,
    opener: Arc<dyn LinkOpener>,
) -> bool {
    if REGISTRATION.set(()).is_err() {
        tracing::debug!("background notification handlers already registered");
        return false;
    }

    let press = BackgroundPressHandler::new(opener);
    renderer.on_background_event(handler(move |event: LocalEvent| {
        let press = press.clone();
        async move {
            let outcome = press.handle(event).await;
            tracing::debug!(outcome = ?outcome, "background notification press handled");
        }
    }));

    // The OS renders notification payloads itself while backgrounded
    platform.set_background_message_handler(handler(|message: RemoteMessage| async move {
        tracing::debug!(
            message_id = ?message.message_id,
            keys = message.data.len(),
            "background data message received"
        );
    }));

    tracing::info!("background notification handlers registered");
    true
}
