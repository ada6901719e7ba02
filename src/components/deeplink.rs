// Deep-link resolution for notification-open intents
// URL beats route beats default: a URL still works before the navigator exists,
// route navigation needs a mounted navigation tree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::content::NotificationData;
use super::platform::{LinkOpener, Navigator};
use super::{OpenIntent, PushError};

/// Navigation params copied from a payload; absent keys stay absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    #[serde(rename = "plantId", skip_serializing_if = "Option::is_none")]
    pub plant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RouteParams {
    pub fn from_data(data: &NotificationData) -> Self {
        Self {
            plant_id: data.get(NotificationData::PLANT_ID).map(str::to_string),
            id: data.get(NotificationData::ID).map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plant_id.is_none() && self.id.is_none()
    }
}

/// The single action an open intent resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLinkAction {
    OpenUrl(String),
    Navigate { route: String, params: RouteParams },
    Fallback { route: String },
}

/// Decide what an open intent's payload should do. Pure.
pub fn resolve(data: &NotificationData, default_route: &str) -> DeepLinkAction {
    if let Some(url) = data.non_empty(NotificationData::URL) {
        return DeepLinkAction::OpenUrl(url.to_string());
    }

    if let Some(route) = data.non_empty(NotificationData::ROUTE) {
        return DeepLinkAction::Navigate {
            route: route.to_string(),
            params: RouteParams::from_data(data),
        };
    }

    DeepLinkAction::Fallback {
        route: default_route.to_string(),
    }
}

/// What actually happened when an action was executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    LinkOpened(String),
    LinkFailed(PushError),
    Navigated(String),
    /// No navigation tree mounted; the intent is dropped
    NavigatorNotReady(String),
}

/// Executes resolved actions against the navigator and link opener
pub struct DeepLinkDispatcher {
    navigator: Arc<dyn Navigator>,
    opener: Arc<dyn LinkOpener>,
    default_route: String,
}

impl DeepLinkDispatcher {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        opener: Arc<dyn LinkOpener>,
        default_route: impl Into<String>,
    ) -> Self {
        Self {
            navigator,
            opener,
            default_route: default_route.into(),
        }
    }

    pub fn default_route(&self) -> &str {
        &self.default_route
    }

    /// Consume an intent and run exactly one action for it
    pub async fn dispatch(&self, intent: OpenIntent) -> DispatchOutcome {
        let intent_id = intent.id();
        let source = intent.source().name();
        let action = resolve(intent.data(), &self.default_route);
        tracing::debug!(%intent_id, source, action = ?action, "resolved open intent");

        match action {
            DeepLinkAction::OpenUrl(url) => open_link(self.opener.as_ref(), url).await,
            DeepLinkAction::Navigate { route, params } => self.navigate(route, Some(&params)),
            DeepLinkAction::Fallback { route } => self.navigate(route, None),
        }
    }

    fn navigate(&self, route: String, params: Option<&RouteParams>) -> DispatchOutcome {
        if !self.navigator.is_ready() {
            tracing::debug!(route = %route, "navigator not ready, dropping intent");
            return DispatchOutcome::NavigatorNotReady(route);
        }
        self.navigator.navigate(&route, params);
        DispatchOutcome::Navigated(route)
    }
}

/// Best-effort link open shared with the background handler
pub(crate) async fn open_link(opener: &dyn LinkOpener, url: String) -> DispatchOutcome {
    match opener.open(&url).await {
        Ok(()) => DispatchOutcome::LinkOpened(url),
        Err(error) => {
            tracing::warn!(url = %url, error = %error, "failed to open notification link");
            DispatchOutcome::LinkFailed(error)
        },
    }
}
